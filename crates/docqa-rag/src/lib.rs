//! docqa-rag
//!
//! Answer synthesis and the request pipeline: a Gemini client behind the
//! `LanguageModel` capability, the prompt templates, the three answer
//! strategies and the orchestrator that picks between them.

pub mod answer;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod synthesizer;

pub use llm::GeminiClient;
pub use pipeline::{HealthReport, HealthStatus, Pipeline, PipelineContext, Response, Route, SetupStatus};
