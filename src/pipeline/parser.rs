//! Pipeline Parser
//!
//! Loads pipeline definitions from YAML or JSON files and validates them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use super::model::PipelineDefinition;

/// Errors raised while loading a pipeline definition.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not read pipeline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pipeline has no steps")]
    Empty,

    #[error("Step {0} has an empty or whitespace-only name")]
    EmptyName(usize),
}

/// Supported definition formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Loads and validates a pipeline from a file.
///
/// The format follows the extension: `.json` is JSON, anything else YAML.
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<PipelineDefinition, PipelineError> {
    let path = path.as_ref();
    info!("Loading pipeline: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pipeline = parse_pipeline(&content, Format::from_path(path))?;
    info!("Pipeline loaded: {} steps", pipeline.len());

    Ok(pipeline)
}

/// Parses and validates a pipeline from text.
pub fn parse_pipeline(content: &str, format: Format) -> Result<PipelineDefinition, PipelineError> {
    let mut pipeline: PipelineDefinition = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };

    for step in &mut pipeline.steps {
        step.name = step.name.trim().to_string();
    }

    validate_pipeline(&pipeline)?;
    Ok(pipeline)
}

/// Checks that the pipeline has steps and every step has a name.
///
/// Duplicate names are accepted: lookups by name use the first match.
pub fn validate_pipeline(pipeline: &PipelineDefinition) -> Result<(), PipelineError> {
    if pipeline.is_empty() {
        return Err(PipelineError::Empty);
    }

    let mut seen = HashSet::new();
    for (index, step) in pipeline.steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(PipelineError::EmptyName(index));
        }

        if !seen.insert(step.name.as_str()) {
            warn!(
                "Step {} reuses the name '{}'; starting by name will use the first one",
                index, step.name
            );
        }

        if step.command.is_none() {
            debug!("Step '{}' has no command and will do nothing", step.name);
        }
    }

    Ok(())
}
