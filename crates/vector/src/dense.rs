//! Dense sentence embeddings via Candle
//!
//! Loads a BERT-family sentence encoder from the Hugging Face hub and
//! produces mean-pooled, L2-normalized embeddings. The model is shared
//! between unfitted copies, so rebuilding the engine does not reload it.

use anyhow::Context;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use snipsearch_common::{Result, SnipSearchError};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::info;

use crate::similarity::l2_normalize;
use crate::types::Vector;
use crate::vectorizer::Vectorizer;

struct Encoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

/// Pretrained sentence encoder
///
/// Stateless per call: `fit` only rejects an empty corpus.
#[derive(Clone)]
pub struct DenseVectorizer {
    model_id: String,
    encoder: Arc<Encoder>,
}

impl DenseVectorizer {
    /// Download (or reuse the cached) model from the Hugging Face hub
    pub fn from_hub(model_id: &str) -> Result<Self> {
        let encoder = Self::load(model_id)
            .map_err(|e| SnipSearchError::embedding(format!("{:#}", e)))?;

        info!(
            "Dense vectorizer initialized - model: {}, dimension: {}",
            model_id, encoder.dimension
        );

        Ok(Self {
            model_id: model_id.to_string(),
            encoder: Arc::new(encoder),
        })
    }

    fn load(model_id: &str) -> anyhow::Result<Encoder> {
        // CPU for now
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json").context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json").context("Failed to download tokenizer")?;
        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;
        let raw_config: serde_json::Value = serde_json::from_str(&config_contents)?;
        let dimension = raw_config["hidden_size"]
            .as_u64()
            .context("Model config has no hidden_size")? as usize;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // SAFETY: the safetensors file is owned by the hub cache and not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };
        let model = BertModel::load(vb, &config).context("Failed to create BERT model")?;

        Ok(Encoder {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Hugging Face model id
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn encode_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encoder = &self.encoder;
        let encodings = encoder
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        // Right-pad ids and masks to the longest sequence
        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let offset = row * max_len;
            flat_ids[offset..offset + ids.len()].copy_from_slice(ids);
            flat_mask[offset..offset + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &encoder.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &encoder.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = encoder
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;

        let mut vectors = pooled.to_vec2::<f32>()?;
        vectors.iter_mut().for_each(|v| l2_normalize(v));
        Ok(vectors)
    }

    /// Mean pooling with attention mask
    fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> anyhow::Result<Tensor> {
        let mask = attention_mask
            .unsqueeze(2)?
            .expand(hidden.shape())?
            .to_dtype(hidden.dtype())?;

        let summed = (hidden * &mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        Ok(summed.broadcast_div(&counts)?)
    }
}

impl Vectorizer for DenseVectorizer {
    fn name(&self) -> &str {
        "dense"
    }

    fn fit(&mut self, corpus: &[&str]) -> Result<()> {
        if corpus.is_empty() {
            return Err(SnipSearchError::EmptyCorpus);
        }
        Ok(())
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        self.encode_batch(texts)
            .map_err(|e| SnipSearchError::embedding(format!("{:#}", e)))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.encoder.dimension)
    }

    fn unfitted(&self) -> Box<dyn Vectorizer> {
        Box::new(self.clone())
    }
}
