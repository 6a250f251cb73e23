//! Runner Errors
//!
//! Every failure the runner can report to its caller. Nothing is retried
//! or swallowed internally: the first error ends the current run.

use thiserror::Error;

/// Failure type returned by a step action.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`StepSequence`](super::StepSequence) operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The command matched neither an in-range index nor a step name.
    #[error("{command:?} is not a valid process step name, use: {}", .valid.join(", "))]
    InvalidStepReference {
        command: String,
        /// Every valid identifier, rendered as `<index>:"<name>"`.
        valid: Vec<String>,
    },

    /// The requested start step relies on the steps before it.
    #[error("step {index}: {name:?} cannot be started independently, it relies on previous steps")]
    DependentStart { index: usize, name: String },

    /// A step action failed; the original error is kept as the source.
    #[error("could not perform step {index}, {name}")]
    StepExecution {
        index: usize,
        name: String,
        #[source]
        source: StepError,
    },

    /// Resolving a start command failed.
    #[error("could not parse command")]
    UnparsableCommand {
        #[source]
        source: Box<RunnerError>,
    },

    /// A start index outside the sequence was passed to `run` directly.
    #[error("start index {index} is out of range for a sequence of {len} steps")]
    InvalidStartIndex { index: usize, len: usize },
}

impl RunnerError {
    /// Returns the index of the step this error is bound to, if any.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::DependentStart { index, .. } | Self::StepExecution { index, .. } => Some(*index),
            Self::UnparsableCommand { source } => source.step_index(),
            Self::InvalidStepReference { .. } | Self::InvalidStartIndex { .. } => None,
        }
    }
}
