// Public modules
pub mod config;
pub mod console;
pub mod docker;
pub mod error;
pub mod git;
pub mod logs;
pub mod pipeline;
pub mod stage;

// Re-export common types for convenience
pub use config::{Mode, PipelineConfig};
pub use error::{Error, ErrorCode, Result};
pub use pipeline::{run, RunOptions};
pub use stage::{Stage, StageOutcome};
