//! Walker command construction and the walker → filter process pipeline.

pub mod command;
pub mod pipeline;

pub use command::{build_filter_command, build_walker_command};
pub use pipeline::{PipelineError, PipelineOutcome, ProcessPipeline, SearchPipeline, SearchResult};
