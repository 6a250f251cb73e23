//! Pipeline Definition Model
//!
//! Serializable description of a step sequence made of shell commands.
//!
//! # Example YAML Format
//!
//! ```yaml
//! steps:
//!   - name: fetch
//!     command: git pull --ff-only
//!
//!   - name: build
//!     command: cargo build --release
//!     skip_if_exists: target/release/app
//!
//!   - name: publish
//!     command: ./scripts/publish.sh
//!     dependent: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::shell::run_command;
use crate::runner::{Step, StepSequence};

/// One entry of a pipeline definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepDefinition {
    /// Step name, used for display and to start from
    pub name: String,

    /// Shell command to run; a step without one does nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Whether the step relies on the ones before it
    #[serde(default)]
    pub dependent: bool,

    /// Skip the step when this path exists at run time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_if_exists: Option<String>,
}

impl StepDefinition {
    /// Creates a definition that runs nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            command: None,
            dependent: false,
            skip_if_exists: None,
        }
    }

    /// Sets the shell command for this step.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Marks this step as dependent.
    pub fn dependent(mut self) -> Self {
        self.dependent = true;
        self
    }

    /// Skips this step when `path` exists.
    pub fn skip_if_exists(mut self, path: impl Into<String>) -> Self {
        self.skip_if_exists = Some(path.into());
        self
    }

    /// Builds the runnable step. Relative paths resolve against `working_dir`.
    pub fn to_step(&self, working_dir: Option<&Path>) -> Step {
        let mut step = Step::named(self.name.clone()).with_dependent(self.dependent);

        if let Some(command) = self.command.clone() {
            let dir = working_dir.map(Path::to_path_buf);
            step = step.with_action(move || run_command(&command, dir.as_deref()));
        }

        if let Some(marker) = &self.skip_if_exists {
            let marker = resolve(marker, working_dir);
            step = step.skip_when(move || marker.exists());
        }

        step
    }
}

fn resolve(path: &str, working_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    match working_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// A complete pipeline: its steps in execution order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PipelineDefinition {
    pub steps: Vec<StepDefinition>,
}

impl PipelineDefinition {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step definition.
    pub fn push(&mut self, step: StepDefinition) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Builds a [`StepSequence`] in definition order.
    pub fn to_sequence(&self, working_dir: Option<&Path>) -> StepSequence {
        self.steps
            .iter()
            .map(|definition| definition.to_step(working_dir))
            .collect()
    }
}
