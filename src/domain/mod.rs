pub mod entities;
pub mod errors;
pub mod ports;
pub mod text;

pub use entities::*;
pub use errors::{PipelineError, Result};
