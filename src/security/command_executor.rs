//! SafeCommandExecutor: Type-safe schema-tool execution with injection prevention
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only the schema tools can execute
//! - **Injection prevention**: Uses `std::process::Command`, never a shell
//! - **Argument sanitization**: Arguments passed as a slice, never interpolated
//! - **Working directory validation**: Validates existence before execution
//!
//! The `ToolRunner` trait is the seam the resolvers, rewriter and publisher
//! run their tool invocations through, so every pipeline step can be unit
//! tested with a scripted runner instead of live `cue`/`timoni` binaries.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Allowed tools whitelist for security.
///
/// Only these programs can be executed via SafeCommandExecutor. The pipeline
/// drives exactly two external tools; anything else is a bug.
const ALLOWED_TOOLS: &[&str] = &["cue", "timoni"];

/// Errors that can occur during tool execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Program is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Tool execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

/// Captured output of a tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the tool exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with the given stdout, convenient for tests
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Execution seam for the external schema tools
///
/// Implemented by [`SafeCommandExecutor`] for real runs and by scripted fakes
/// in tests. A non-zero exit is reported through [`ToolOutput::success`], not
/// as an `Err`; callers decide how a failed step is surfaced.
pub trait ToolRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput, CommandError>;
}

/// Safe tool executor with security controls
///
/// # Example
///
/// ```rust,no_run
/// use cue_vendor::{SafeCommandExecutor, ToolRunner};
///
/// let executor = SafeCommandExecutor::new();
/// let output = executor.run("cue", &["version"], std::env::temp_dir().as_path()).unwrap();
/// println!("{}", output.stdout);
/// ```
#[derive(Debug, Default)]
pub struct SafeCommandExecutor;

impl SafeCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SafeCommandExecutor {
    /// Execute a schema tool with whitelist validation.
    ///
    /// # Arguments
    ///
    /// * `program` - The tool to execute (must be in `ALLOWED_TOOLS`)
    /// * `args` - Tool arguments (safely passed without shell interpretation)
    /// * `cwd` - Working directory the tool runs in (must exist)
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Program not in whitelist
    /// - `CommandError::InvalidWorkingDirectory` - Working directory missing
    /// - `CommandError::ExecutionFailed` - Binary not found or spawn error
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput, CommandError> {
        if !ALLOWED_TOOLS.contains(&program) {
            return Err(CommandError::CommandNotAllowed(program.to_string()));
        }

        if !cwd.exists() {
            return Err(CommandError::InvalidWorkingDirectory(cwd.to_path_buf()));
        }

        // Arguments are passed as a slice, never interpolated into a shell
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
