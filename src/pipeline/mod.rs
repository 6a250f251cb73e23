//! Pipeline Definition Module
//!
//! File-backed step definitions for the bundled command line tool:
//! each step is a shell command, turned into a [`StepSequence`](crate::StepSequence).
//!
//! # Structure
//!
//! - [`model`]: Serializable definitions (PipelineDefinition, StepDefinition)
//! - [`parser`]: YAML/JSON loading and validation
//! - [`shell`]: Shell command execution for step actions

pub mod model;
pub mod parser;
pub mod shell;

pub use model::{PipelineDefinition, StepDefinition};
pub use parser::{load_pipeline, parse_pipeline, Format, PipelineError};
pub use shell::{run_command, CommandFailed};
