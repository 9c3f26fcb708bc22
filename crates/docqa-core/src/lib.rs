//! docqa-core
//!
//! Shared domain types, capability traits, configuration and the ingestion
//! front half of the pipeline (loading and chunking).

pub mod chunker;
pub mod config;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod stage;
pub mod traits;
pub mod types;

pub use stage::Availability;
