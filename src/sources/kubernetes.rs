//! Kubernetes source resolver
//!
//! Vendors the Kubernetes core API schemas for one API line via
//! `timoni mod vendor k8s`, capturing the generated tree under the fixed
//! `k8s.io` namespace.

use crate::core::error::VendorError;
use crate::core::schema::{VendoredSchema, parse_version};
use crate::security::ToolRunner;
use crate::sources::{ensure_dir, run_tool};
use std::path::Path;
use std::sync::Arc;

const NAMESPACE: &str = "k8s.io";

/// Resolver for Kubernetes core API schemas
pub struct KubernetesResolver {
    runner: Arc<dyn ToolRunner>,
}

impl KubernetesResolver {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Vendor the API schemas for the requested version
    ///
    /// The version is parsed as semver and reduced to its `major.minor` line
    /// for the vendoring tool; a malformed version is a fatal parse error.
    ///
    /// # Arguments
    ///
    /// * `version` - Requested Kubernetes version, e.g. `"1.29.3"`
    /// * `scratch` - Per-source scratch directory, created if missing
    pub fn resolve(&self, version: &str, scratch: &Path) -> Result<VendoredSchema, VendorError> {
        let parsed = parse_version("kubernetes", version)?;
        let api_line = format!("{}.{}", parsed.major, parsed.minor);

        ensure_dir(scratch)?;
        run_tool(
            self.runner.as_ref(),
            "cue",
            &["mod", "init"],
            scratch,
            NAMESPACE,
        )?;
        run_tool(
            self.runner.as_ref(),
            "timoni",
            &["mod", "vendor", "k8s", "-v", &api_line],
            scratch,
            NAMESPACE,
        )?;

        let directory = scratch.join("cue.mod").join("gen").join(NAMESPACE);
        if !directory.is_dir() {
            return Err(VendorError::MissingOutput {
                subject: NAMESPACE.to_string(),
                path: directory,
            });
        }

        Ok(VendoredSchema::new(NAMESPACE, version, directory))
    }
}
