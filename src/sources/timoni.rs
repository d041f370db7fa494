//! Fixed timoni.sh resolver
//!
//! The timoni schema set needs no external input besides the configured tool
//! version: a throwaway module is initialized and its vendored `timoni.sh`
//! package captured. The aggregator runs this resolver exactly once per
//! invocation and prepends its result to every aggregate.

use crate::core::config::ToolConfig;
use crate::core::error::VendorError;
use crate::core::schema::VendoredSchema;
use crate::security::ToolRunner;
use crate::sources::{ensure_dir, run_tool};
use std::path::Path;
use std::sync::Arc;

const NAMESPACE: &str = "timoni.sh";

/// Name of the throwaway module used to capture the timoni.sh package
const SCRATCH_MODULE: &str = "scratch";

/// Resolver for the fixed timoni.sh schema set
pub struct TimoniResolver {
    config: ToolConfig,
    runner: Arc<dyn ToolRunner>,
}

impl TimoniResolver {
    pub fn new(config: ToolConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self { config, runner }
    }

    /// Deterministically produce the timoni.sh schema
    ///
    /// # Arguments
    ///
    /// * `scratch` - Per-run scratch directory, created if missing
    pub fn resolve(&self, scratch: &Path) -> Result<VendoredSchema, VendorError> {
        ensure_dir(scratch)?;
        run_tool(
            self.runner.as_ref(),
            "timoni",
            &["mod", "init", SCRATCH_MODULE],
            scratch,
            NAMESPACE,
        )?;

        let directory = scratch
            .join(SCRATCH_MODULE)
            .join("cue.mod")
            .join("pkg")
            .join(NAMESPACE);
        if !directory.is_dir() {
            return Err(VendorError::MissingOutput {
                subject: NAMESPACE.to_string(),
                path: directory,
            });
        }

        Ok(VendoredSchema::new(
            NAMESPACE,
            self.config.timoni_version.clone(),
            directory,
        ))
    }
}
