//! StepRunner - Sequential Step Runner
//!
//! Runs an ordered list of named steps, one after another, stopping at the
//! first failure. A run can start from any step chosen by index or by
//! name, which gives command line tools a "run from step N" capability
//! (migration scripts, multi-stage builds).
//!
//! # Architecture
//!
//! - [`runner`]: Steps, the step sequence and its run loop, event sinks
//! - [`pipeline`]: YAML/JSON step definitions backed by shell commands
//!
//! # Example
//!
//! ```rust
//! use steprunner::{Step, StepSequence};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut steps = StepSequence::new();
//!     steps
//!         .add(Step::new("create schema", || Ok(())))
//!         .add(Step::new("load data", || Ok(())).dependent())
//!         .add(Step::new("reindex", || Ok(())).skip_when(|| true));
//!
//!     // "0", "create schema", ... as typed by a user
//!     steps.run_from_command("create schema")?;
//!     Ok(())
//! }
//! ```

pub mod pipeline;
pub mod runner;

// Re-export commonly used types
pub use pipeline::{load_pipeline, PipelineDefinition, StepDefinition};
pub use runner::{
    EventKind, LogSink, RecordingSink, RunnerError, Step, StepError, StepEvent, StepSequence,
    StepSink,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "StepRunner";
