//! Schema Publisher - Publishes aggregated schemas to the central registry
//!
//! Publishing runs Validate → Aggregate, authenticates once for the whole
//! batch, then handles each schema in aggregation order: rewrite imports,
//! tidy the dependency closure, publish under the schema's version tag.
//!
//! Unlike aggregation, publishing is best-effort sequential: the batch stops
//! at the first failing schema, but the concatenated output of every publish
//! that already succeeded is returned alongside the error instead of being
//! discarded.

use crate::core::config::ToolConfig;
use crate::core::error::VendorError;
use crate::core::schema::{RegistryCoordinate, VendoredSchema};
use crate::orchestration::aggregator::VendorAggregator;
use crate::orchestration::rewriter::ImportPathRewriter;
use crate::security::ToolRunner;
use crate::sources::github::RepoBrowser;
use crate::sources::run_tool;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Result of a publish batch
#[derive(Debug)]
pub struct PublishReport {
    /// Concatenated stdout of every successful publish, in batch order
    pub output: String,

    /// Successfully published schemas as `name@version`
    pub published: Vec<String>,

    /// The first failure, if any; later schemas were never attempted
    pub failed: Option<PublishFailure>,
}

impl PublishReport {
    pub fn success(&self) -> bool {
        self.failed.is_none()
    }
}

/// A failed schema publish
#[derive(Debug)]
pub struct PublishFailure {
    /// Name of the schema that failed
    pub schema: String,
    pub error: VendorError,
}

/// Publishes vendored schemas to the central registry
pub struct SchemaPublisher {
    aggregator: VendorAggregator,
    rewriter: ImportPathRewriter,
    runner: Arc<dyn ToolRunner>,
}

impl SchemaPublisher {
    pub fn new(
        config: ToolConfig,
        runner: Arc<dyn ToolRunner>,
        browser: Arc<dyn RepoBrowser>,
    ) -> Self {
        Self {
            aggregator: VendorAggregator::new(config, runner.clone(), browser),
            rewriter: ImportPathRewriter::new(runner.clone()),
            runner,
        }
    }

    /// Vendor every schema the manifest names and publish the batch
    ///
    /// Validation and aggregation failures abort with no partial result.
    /// Per-schema failures are reported through the returned
    /// [`PublishReport`] together with the output produced so far.
    ///
    /// # Arguments
    ///
    /// * `raw` - The manifest document bytes (YAML)
    /// * `owner` - Registry owner the schemas are published under
    /// * `repo` - Registry repository the schemas are published under
    /// * `token` - Opaque registry token; never logged
    pub async fn publish(
        &self,
        raw: &[u8],
        owner: &str,
        repo: &str,
        token: &SecretString,
    ) -> Result<PublishReport, VendorError> {
        let workspace = TempDir::new()
            .map_err(|e| VendorError::io("creating scratch workspace", e))?;

        let schemas = self.aggregator.vendor(raw, workspace.path()).await?;

        println!("🔑 Authenticating against the registry");
        self.login(workspace.path(), token)?;

        Ok(self.publish_batch(&schemas, owner, repo, workspace.path()))
    }

    /// Authenticate once for the whole batch
    fn login(&self, cwd: &Path, token: &SecretString) -> Result<(), VendorError> {
        // The token only ever reaches the tool's argument vector
        run_tool(
            self.runner.as_ref(),
            "cue",
            &["login", "--token", token.expose_secret()],
            cwd,
            "registry",
        )?;
        Ok(())
    }

    fn publish_batch(
        &self,
        schemas: &[VendoredSchema],
        owner: &str,
        repo: &str,
        workspace: &Path,
    ) -> PublishReport {
        let mut report = PublishReport {
            output: String::new(),
            published: Vec::new(),
            failed: None,
        };

        for (index, schema) in schemas.iter().enumerate() {
            println!("🚀 Publishing {}@{}", schema.name, schema.version);
            match self.publish_schema(schema, index, owner, repo, workspace) {
                Ok(stdout) => {
                    report.output.push_str(&stdout);
                    report
                        .published
                        .push(format!("{}@{}", schema.name, schema.version));
                }
                Err(error) => {
                    eprintln!("❌ Publishing {} failed: {error}", schema.name);
                    report.failed = Some(PublishFailure {
                        schema: schema.name.clone(),
                        error,
                    });
                    break;
                }
            }
        }

        report
    }

    fn publish_schema(
        &self,
        schema: &VendoredSchema,
        index: usize,
        owner: &str,
        repo: &str,
        workspace: &Path,
    ) -> Result<String, VendorError> {
        let coordinate = RegistryCoordinate::for_schema(schema, owner, repo)?;
        let scratch = workspace.join(format!("publish-{index}-{}", schema.name));
        let rewritten = self.rewriter.rewrite(schema, &coordinate, &scratch)?;

        run_tool(
            self.runner.as_ref(),
            "cue",
            &["mod", "tidy"],
            &rewritten.directory,
            &schema.name,
        )?;
        let output = run_tool(
            self.runner.as_ref(),
            "cue",
            &["mod", "publish", &schema.version, "--ignore", "--json"],
            &rewritten.directory,
            &schema.name,
        )?;

        Ok(output.stdout)
    }
}
