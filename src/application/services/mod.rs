mod pipeline;
mod processor;

pub use pipeline::{PipelineHandle, RagPipeline, DEFAULT_TOP_K};
pub use processor::DocumentProcessor;
