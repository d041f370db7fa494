//! Source resolvers
//!
//! One resolver per source kind: the fixed timoni.sh schemas, Kubernetes API
//! lines vendored via timoni, and CRD schemas fetched from GitHub-hosted
//! artifacts. Each resolver turns a source descriptor into one or more
//! [`crate::core::VendoredSchema`] values inside the pipeline's scratch
//! workspace.

pub mod github;
pub mod kubernetes;
pub mod timoni;

pub use github::{ContentEntry, GithubClient, GithubResolver, RepoBrowser, build_fetch_targets};
pub use kubernetes::KubernetesResolver;
pub use timoni::TimoniResolver;

use crate::core::error::VendorError;
use crate::security::{ToolOutput, ToolRunner};
use std::path::Path;

/// Run a tool and turn a non-zero exit into a [`VendorError::ToolFailed`]
/// naming the schema or source the invocation belongs to.
pub(crate) fn run_tool(
    runner: &dyn ToolRunner,
    program: &str,
    args: &[&str],
    cwd: &Path,
    subject: &str,
) -> Result<ToolOutput, VendorError> {
    let output = runner.run(program, args, cwd)?;
    if !output.success {
        return Err(VendorError::ToolFailed {
            tool: program.to_string(),
            subject: subject.to_string(),
            stderr: output.stderr,
        });
    }
    Ok(output)
}

/// Create a scratch directory, wrapping the I/O error with context
pub(crate) fn ensure_dir(path: &Path) -> Result<(), VendorError> {
    std::fs::create_dir_all(path)
        .map_err(|e| VendorError::io(format!("creating {}", path.display()), e))
}
