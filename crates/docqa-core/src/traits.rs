use crate::types::{Chunk, ModelResponse};

/// Text embedding capability. Implementations return L2-normalized vectors of
/// length [`Embedder::dim`].
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Given a query and a count `k`, return up to `k` chunks, most relevant first.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str, k: usize) -> anyhow::Result<Vec<Chunk>>;
    fn name(&self) -> &str;
}

/// Language model capability: prompt in, `{ text }` out.
pub trait LanguageModel: Send + Sync {
    fn invoke(&self, prompt: &str) -> anyhow::Result<ModelResponse>;
}
