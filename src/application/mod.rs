//! Application layer - use cases and orchestration.
//!
//! Services here drive the domain through its ports (traits) and never touch
//! concrete adapters directly.

pub mod services;

pub use services::{DocumentProcessor, PipelineHandle, RagPipeline, DEFAULT_TOP_K};
