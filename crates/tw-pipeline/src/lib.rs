pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{DebugOptions, PipelineOptions, DEFAULT_BATCH_SIZE};
pub use error::{PipelineDiagnostics, PipelineError};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineStage};
