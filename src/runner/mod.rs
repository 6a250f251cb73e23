//! Step Runner Module
//!
//! Runs an ordered list of named steps, optionally starting from a step
//! chosen by index or name.
//!
//! # Structure
//!
//! - [`step`]: The [`Step`] record (name, action, dependent flag, skip predicate)
//! - [`sequence`]: [`StepSequence`] with start resolution and the run loop
//! - [`sink`]: Step events and the sinks that consume them
//! - [`error`]: [`RunnerError`] taxonomy

pub mod error;
pub mod sequence;
pub mod sink;
pub mod step;

pub use error::{RunnerError, StepError};
pub use sequence::StepSequence;
pub use sink::{EventKind, LogSink, RecordingSink, StepEvent, StepSink};
pub use step::{Action, SkipPredicate, Step};
