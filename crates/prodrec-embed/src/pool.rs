use anyhow::{Result, ensure};
use candle_core::Tensor;

/// Average of the token states kept by `attention_mask`. `[B,T,H] -> [B,H]`.
///
/// A fully masked row averages to zeros instead of dividing by zero.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (_, tokens, _) = hidden.dims3()?;
    let (_, mask_tokens) = attention_mask.dims2()?;
    ensure!(tokens == mask_tokens, "mask covers {mask_tokens} tokens, hidden states have {tokens}");
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.maximum(1f64)?;
    Ok(summed.broadcast_div(&counts)?)
}

/// Scale every row to unit L2 norm. Zero rows stay zero.
pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let norms = rows.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(1e-12f64)?;
    Ok(rows.broadcast_div(&norms)?)
}

pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    l2_normalize(&masked_mean(hidden, attention_mask)?)
}
