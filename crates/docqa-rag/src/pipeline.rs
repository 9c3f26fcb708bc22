//! Request-scoped orchestration over a startup-built [`PipelineContext`].
//!
//! Every call walks the same one-way ladder:
//! model guard → query guard → load/chunk → indexes → retriever → answer.
//! Nothing is kept between calls except the context.

use std::env;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use docqa_core::chunker::Chunker;
use docqa_core::config::{EmbeddingProvider, Settings};
use docqa_core::ingest::load_and_chunk;
use docqa_core::loader::DocumentLoader;
use docqa_core::traits::{Embedder, LanguageModel};
use docqa_core::types::DocumentSet;
use docqa_core::Availability;
use docqa_embed::build_embedder;
use docqa_hybrid::{retriever_from_indexes, SelectedRetriever};
use docqa_text::LexicalIndex;
use docqa_vector::VectorIndex;

use crate::answer::{EMPTY_QUERY, MODEL_NOT_INITIALIZED};
use crate::llm::GeminiClient;
use crate::synthesizer::{Synthesis, Synthesizer};

/// Capabilities built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct PipelineContext {
    model: Availability<Arc<dyn LanguageModel>>,
    embedder: Option<Arc<dyn Embedder>>,
    settings: Settings,
}

impl PipelineContext {
    /// One-time startup: credential check, model client, embedder.
    ///
    /// A model failure leaves the whole context unavailable. So does a local
    /// sentence encoder that is configured but cannot be loaded; only a
    /// disabled provider runs without vector retrieval.
    pub fn initialize(settings: &Settings) -> Self {
        let model = match GeminiClient::from_env(&settings.llm) {
            Ok(client) => Arc::new(client) as Arc<dyn LanguageModel>,
            Err(e) => {
                warn!(error = %e, "llm unavailable");
                return Self::unavailable(format!("Failed to initialize LLM: {e}"), settings.clone());
            }
        };
        let embedder = match build_embedder(&settings.embedding) {
            Availability::Ready(embedder) => Some(embedder),
            Availability::Unavailable(reason) if settings.embedding.provider == EmbeddingProvider::Local => {
                return Self::unavailable(format!("Failed to initialize embeddings: {reason}"), settings.clone());
            }
            Availability::Unavailable(_) => None,
        };
        info!(embeddings = embedder.is_some(), "pipeline context initialized");
        Self { model: Availability::Ready(model), embedder, settings: settings.clone() }
    }

    pub fn new(model: Availability<Arc<dyn LanguageModel>>, embedder: Option<Arc<dyn Embedder>>, settings: Settings) -> Self {
        Self { model, embedder, settings }
    }

    /// A context with no capabilities at all.
    pub fn unavailable(reason: impl Into<String>, settings: Settings) -> Self {
        Self { model: Availability::unavailable(reason), embedder: None, settings }
    }

    pub fn model(&self) -> &Availability<Arc<dyn LanguageModel>> {
        &self.model
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Which rung of the ladder produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    ModelUnavailable,
    EmptyQuery,
    DirectLlm,
    ContextFallback,
    Rag,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModelUnavailable => "model_unavailable",
            Self::EmptyQuery => "empty_query",
            Self::DirectLlm => "direct_llm",
            Self::ContextFallback => "context_fallback",
            Self::Rag => "rag",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub answer: String,
    pub route: Route,
    pub sources: Vec<String>,
}

impl Response {
    fn new(route: Route, synthesis: Synthesis) -> Self {
        Self { answer: synthesis.answer, route, sources: synthesis.sources }
    }

    fn fixed(route: Route, answer: &str) -> Self {
        Self { answer: answer.to_string(), route, sources: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStatus {
    pub llm_initialized: bool,
    pub embeddings_initialized: bool,
    pub api_key_set: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthReport {
    fn unhealthy(reason: impl Into<String>) -> Self {
        Self { status: HealthStatus::Unhealthy, reason: Some(reason.into()), timestamp: None }
    }
}

/// Builds the retriever for one run from its chunks and the optional embedder.
pub type RetrieverFactory = dyn Fn(Arc<DocumentSet>, Option<Arc<dyn Embedder>>) -> Option<SelectedRetriever> + Send + Sync;

/// Lexical and vector indexes over `docs`, combined by availability.
pub fn build_retriever(docs: Arc<DocumentSet>, embedder: Option<Arc<dyn Embedder>>) -> Option<SelectedRetriever> {
    let lexical = LexicalIndex::try_build(Arc::clone(&docs));
    let vector = VectorIndex::try_build(docs, embedder);
    retriever_from_indexes(lexical, vector)
}

pub struct Pipeline {
    ctx: PipelineContext,
    loader: DocumentLoader,
    retriever_factory: Box<RetrieverFactory>,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx, loader: DocumentLoader::new(), retriever_factory: Box::new(build_retriever) }
    }

    /// Replace how retrievers are assembled for each run.
    pub fn with_retriever_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Arc<DocumentSet>, Option<Arc<dyn Embedder>>) -> Option<SelectedRetriever> + Send + Sync + 'static,
    {
        self.retriever_factory = Box::new(factory);
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Swap in a freshly built context.
    pub fn reconfigure(&mut self, ctx: PipelineContext) {
        info!(llm = ctx.model.is_ready(), embeddings = ctx.embedder.is_some(), "pipeline reconfigured");
        self.ctx = ctx;
    }

    /// Drop the model and embedder; later calls take the model-unavailable route.
    pub fn teardown(&mut self) {
        let settings = self.ctx.settings.clone();
        self.ctx = PipelineContext::unavailable("pipeline torn down", settings);
        info!("pipeline torn down");
    }

    pub fn get_response<P: AsRef<Path>>(&self, query: &str, file_paths: &[P]) -> String {
        self.respond(query, file_paths).answer
    }

    pub fn respond<P: AsRef<Path>>(&self, query: &str, file_paths: &[P]) -> Response {
        let response = self.route(query, file_paths);
        info!(route = %response.route, sources = response.sources.len(), "answered");
        response
    }

    fn route<P: AsRef<Path>>(&self, query: &str, file_paths: &[P]) -> Response {
        let Some(model) = self.ctx.model.ready() else {
            return Response::fixed(Route::ModelUnavailable, MODEL_NOT_INITIALIZED);
        };
        if query.trim().is_empty() {
            return Response::fixed(Route::EmptyQuery, EMPTY_QUERY);
        }

        let settings = &self.ctx.settings;
        let synth = Synthesizer::new(&**model, settings.retrieval.top_k, settings.retrieval.fallback_context_chunks);

        let chunker = Chunker::from_settings(&settings.chunking);
        let docs = load_and_chunk(&self.loader, &chunker, file_paths);
        if docs.is_empty() {
            return Response::new(Route::DirectLlm, synth.direct(query));
        }

        let docs = Arc::new(docs);
        match (self.retriever_factory)(Arc::clone(&docs), self.ctx.embedder.clone()) {
            Some(selected) => {
                info!(retriever = %selected.kind, "retrieval-augmented answer");
                Response::new(Route::Rag, synth.grounded(&*selected.retriever, query))
            }
            None => {
                warn!(chunks = docs.len(), "no retriever available; answering from leading chunks");
                Response::new(Route::ContextFallback, synth.context_fallback(&docs, query))
            }
        }
    }

    pub fn setup_status(&self) -> SetupStatus {
        SetupStatus {
            llm_initialized: self.ctx.model.is_ready(),
            embeddings_initialized: self.ctx.embedder.is_some(),
            api_key_set: env::var(&self.ctx.settings.llm.api_key_env).is_ok_and(|v| !v.is_empty()),
        }
    }

    /// Send the model a one-word prompt and report whether it answers.
    pub fn health_check(&self) -> HealthReport {
        let Some(model) = self.ctx.model.ready() else {
            return HealthReport::unhealthy("LLM not initialized");
        };
        match model.invoke("test") {
            Ok(r) if r.text.trim().is_empty() => HealthReport::unhealthy("LLM not responding"),
            Ok(_) => HealthReport { status: HealthStatus::Healthy, reason: None, timestamp: Some(chrono::Local::now().to_rfc3339()) },
            Err(e) => HealthReport::unhealthy(e.to_string()),
        }
    }
}
