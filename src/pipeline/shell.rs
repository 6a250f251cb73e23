//! Shell Command Actions
//!
//! Runs a pipeline step's command through the system shell and turns a
//! non-zero exit into a step error.

use std::path::Path;
use std::process::{Command, Output};

use log::{debug, warn};
use thiserror::Error;

use crate::runner::StepError;

/// Shells tried in order.
const SHELLS: &[&str] = &["bash", "sh"];

/// A command that ran but did not succeed.
#[derive(Debug, Error)]
#[error("command exited with {}: {stderr}", exit_code_label(.code))]
pub struct CommandFailed {
    pub code: Option<i32>,
    pub stderr: String,
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

/// Executes `command` with `-c` in the first available shell.
///
/// # Arguments
///
/// * `command` - Shell command line
/// * `working_dir` - Optional directory to run in
///
/// # Returns
///
/// * `Ok(())` - Command exited with status 0
/// * `Err` - Command could not start or exited unsuccessfully
pub fn run_command(command: &str, working_dir: Option<&Path>) -> Result<(), StepError> {
    let output = spawn(command, working_dir)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!("stdout: {}", stdout.trim());
    }

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(CommandFailed {
        code: output.status.code(),
        stderr,
    }
    .into())
}

fn spawn(command: &str, working_dir: Option<&Path>) -> Result<Output, StepError> {
    if let Some(dir) = working_dir {
        if !dir.is_dir() {
            return Err(format!("Working directory does not exist: {}", dir.display()).into());
        }
    }

    let mut last_error = None;

    for shell in SHELLS {
        let mut cmd = Command::new(shell);
        cmd.arg("-c").arg(command);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
            debug!("Executing in directory: {}", dir.display());
        }

        match cmd.output() {
            Ok(output) => return Ok(output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Shell '{}' not available, trying next", shell);
                last_error = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(match last_error {
        Some(e) => e.into(),
        None => "no shell available".into(),
    })
}
