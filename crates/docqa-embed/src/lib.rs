//! docqa-embed
//!
//! Sentence embeddings for the vector index: a candle BERT encoder
//! (all-MiniLM-L6-v2 layout, mean pooling, L2 normalization) loaded from a
//! local model directory, and a deterministic hashing embedder for tests and
//! offline development.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{Device, DType};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use docqa_core::config::{expand_path, EmbeddingProvider, EmbeddingSettings};
use docqa_core::traits::Embedder;
use docqa_core::Availability;

pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;

pub const FAKE_EMBEDDING_DIM: usize = 384;

pub struct BertEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl BertEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = encoder_device();
        info!(dir = %model_dir.display(), device = ?device, "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;
        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(dim, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let enc = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden = self.model.forward(&enc.input_ids, &enc.token_type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &enc.attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?;
        if emb.len() != self.dim { return Err(anyhow!("encoder produced {} dims, expected {}", emb.len(), self.dim)); }
        if start.elapsed().as_millis() > 100 { debug!(ms = start.elapsed().as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

/// Metal when built with the `metal` feature and a GPU answers, else CPU.
fn encoder_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(dev) => return dev,
        Err(e) => debug!(error = %e, "metal unavailable, encoding on cpu"),
    }
    Device::Cpu
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? };
        return Ok(vb);
    }
    let weights_path = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&weights_path)
        .map_err(|e| anyhow!("Failed to read weights from {}: {}", weights_path.display(), e))?;
    let weights_map: std::collections::HashMap<String, candle_core::Tensor> = weights.into_iter().collect();
    Ok(VarBuilder::from_tensors(weights_map, DType::F32, device))
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { texts.iter().map(|t| self.embed_one(t)).collect() }
}

/// Hashes whitespace tokens into buckets. Deterministic and unit-normalized,
/// with no model files required.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } } }

impl Default for FakeEmbedder { fn default() -> Self { Self::new(FAKE_EMBEDDING_DIM) } }

impl FakeEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish();
            let idx = (h as usize) % self.dim; let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
}

fn fake_forced_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// One-time embedder startup. The caller decides whether an unavailable
/// embedder is fatal.
pub fn build_embedder(settings: &EmbeddingSettings) -> Availability<Arc<dyn Embedder>> {
    if fake_forced_by_env() { info!("APP_USE_FAKE_EMBEDDINGS set, using FakeEmbedder"); return Availability::Ready(Arc::new(FakeEmbedder::default())); }
    match settings.provider {
        EmbeddingProvider::Disabled => Availability::unavailable("embeddings disabled by configuration"),
        EmbeddingProvider::Fake => Availability::Ready(Arc::new(FakeEmbedder::default())),
        EmbeddingProvider::Local => {
            let loaded = resolve_model_dir(&settings.model_dir).and_then(|dir| BertEmbedder::load(&dir, settings.max_len));
            Availability::from_result("embeddings", loaded).map(|m| Arc::new(m) as Arc<dyn Embedder>)
        }
    }
}

fn resolve_model_dir(configured: &str) -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = expand_path(&dir); if p.exists() { debug!(var, dir = %p.display(), "using model dir from env"); return Ok(p); } }
    }
    let p = expand_path(configured); if p.exists() { return Ok(p); }
    Err(anyhow!("Could not locate sentence encoder directory (tried APP_MODEL_DIR, MODEL_DIR, {})", configured))
}
