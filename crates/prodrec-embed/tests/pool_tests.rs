use candle_core::{DType, Device, Tensor};
use prodrec_embed::pool::{l2_normalize, masked_mean};
use prodrec_embed::masked_mean_l2;

fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn padding_tokens_do_not_contribute() {
    let dev = Device::Cpu;
    // token 1 is padding
    let hidden = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 50.0, 60.0, 70.0, 80.0], (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0], (1, 2), &dev).unwrap();
    let pooled: Vec<Vec<f32>> = masked_mean_l2(&hidden, &mask).unwrap().to_vec2().unwrap();
    let norm = 30f32.sqrt();
    assert!(close(&pooled[0], &[1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm]));
}

#[test]
fn mean_covers_every_kept_token() {
    let dev = Device::Cpu;
    let hidden = Tensor::from_slice(&[2.0f32, 0.0, 4.0, 2.0, 9.0, 9.0], (1, 3, 2), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 1, 0], (1, 3), &dev).unwrap();
    let mean: Vec<Vec<f32>> = masked_mean(&hidden, &mask).unwrap().to_vec2().unwrap();
    assert!(close(&mean[0], &[3.0, 1.0]));
}

#[test]
fn fully_masked_row_is_zero() {
    let dev = Device::Cpu;
    let hidden = Tensor::ones((1, 2, 3), DType::F32, &dev).unwrap();
    let mask = Tensor::zeros((1, 2), DType::U32, &dev).unwrap();
    let pooled: Vec<Vec<f32>> = masked_mean_l2(&hidden, &mask).unwrap().to_vec2().unwrap();
    assert!(close(&pooled[0], &[0.0, 0.0, 0.0]));
}

#[test]
fn normalized_rows_have_unit_length() {
    let dev = Device::Cpu;
    let rows = Tensor::from_slice(&[3.0f32, 4.0, 0.0, 5.0], (2, 2), &dev).unwrap();
    let out: Vec<Vec<f32>> = l2_normalize(&rows).unwrap().to_vec2().unwrap();
    assert!(close(&out[0], &[0.6, 0.8]));
    assert!(close(&out[1], &[0.0, 1.0]));
}

#[test]
fn rejects_mismatched_shapes() {
    let dev = Device::Cpu;
    let flat = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&flat, &Tensor::ones((2, 1), DType::F32, &dev).unwrap()).is_err());
    let hidden = Tensor::zeros((1, 3, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean(&hidden, &Tensor::ones((1, 2), DType::U32, &dev).unwrap()).is_err());
}
