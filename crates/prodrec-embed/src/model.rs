use anyhow::{Result, anyhow, ensure};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use prodrec_core::traits::Embedder;

use crate::pool::masked_mean_l2;

pub const BGE_M3_DIM: usize = 1024;

/// XLM-RoBERTa pad token.
const PAD_ID: u32 = 1;
const PAD_TOKEN: &str = "<pad>";

/// BGE-M3 sentence embedder running locally through candle.
///
/// `model_dir` must contain `tokenizer.json`, `config.json` and either
/// `model.safetensors` or `pytorch_model.bin`. Every input is padded or
/// truncated to exactly `max_len` tokens.
pub struct EmbeddingModel { model: XLMRobertaModel, tokenizer: Tokenizer, device: Device }

impl EmbeddingModel {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        ensure!(model_dir.exists(), "model directory {} does not exist", model_dir.display());
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), max_len, "loading BGE-M3 model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let max_len = max_len.max(1);
        tokenizer
            .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
            .map_err(|e| anyhow!("Invalid truncation settings: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_len),
            pad_id: PAD_ID,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));

        let config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(model_dir.join("config.json"))?)?;
        let safetensors = model_dir.join("model.safetensors");
        let weights: HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?.into_iter().collect()
        };
        let model = XLMRobertaModel::new(&config, VarBuilder::from_tensors(weights, DType::F32, &device))?;
        tracing::info!("BGE-M3 model loaded");
        Ok(Self { model, tokenizer, device })
    }

    /// Input ids and attention mask, each `[1, max_len]`.
    fn encode(&self, text: &str) -> Result<(Tensor, Tensor)> {
        let encoding = self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        Ok((input_ids, attention_mask))
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = self.encode(text)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let emb = masked_mean_l2(&hidden, &attention_mask)?.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        ensure!(emb.len() == BGE_M3_DIM, "expected {}-dim embedding, got {}", BGE_M3_DIM, emb.len());
        if start.elapsed().as_millis() > 100 { tracing::debug!(ms = start.elapsed().as_millis(), "slow embedding"); }
        Ok(emb)
    }
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => { tracing::info!("embedding on Metal"); return dev; }
            Err(e) => tracing::warn!(error = %e, "Metal unavailable, falling back to CPU"),
        }
    }
    Device::Cpu
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { BGE_M3_DIM }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}
