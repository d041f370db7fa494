//! Vendor Aggregator - Fans a validated manifest out to every resolver
//!
//! The aggregate is the ordered union of the fixed timoni.sh schema, every
//! Kubernetes resolver result in manifest order, and every GitHub resolver
//! result in manifest order. The first failing resolver aborts the whole
//! aggregate; there is no partial-success contract at this layer.

use crate::core::config::ToolConfig;
use crate::core::error::VendorError;
use crate::core::manifest::Manifest;
use crate::core::schema::VendoredSchema;
use crate::security::ToolRunner;
use crate::sources::github::{GithubResolver, RepoBrowser};
use crate::sources::kubernetes::KubernetesResolver;
use crate::sources::timoni::TimoniResolver;
use crate::validation::ManifestValidator;
use std::path::Path;
use std::sync::Arc;

/// Orchestrates all source resolvers for one manifest
pub struct VendorAggregator {
    validator: ManifestValidator,
    timoni: TimoniResolver,
    kubernetes: KubernetesResolver,
    github: GithubResolver,
}

impl VendorAggregator {
    pub fn new(
        config: ToolConfig,
        runner: Arc<dyn ToolRunner>,
        browser: Arc<dyn RepoBrowser>,
    ) -> Self {
        Self {
            validator: ManifestValidator::new(),
            timoni: TimoniResolver::new(config, runner.clone()),
            kubernetes: KubernetesResolver::new(runner.clone()),
            github: GithubResolver::new(runner, browser),
        }
    }

    /// Vendor every schema a manifest names
    ///
    /// Validation runs to completion before any resolver executes; an
    /// invalid manifest causes no fetch or tool activity at all.
    ///
    /// # Arguments
    ///
    /// * `raw` - The manifest document bytes (YAML)
    /// * `workspace` - Scratch directory owned by this pipeline run
    pub async fn vendor(
        &self,
        raw: &[u8],
        workspace: &Path,
    ) -> Result<Vec<VendoredSchema>, VendorError> {
        self.validator.validate(raw)?;
        let manifest = Manifest::from_yaml(raw)?;

        let mut schemas = Vec::new();

        println!("📦 Vendoring timoni.sh schemas");
        schemas.push(self.timoni.resolve(&workspace.join("timoni"))?);

        for (index, source) in manifest.kubernetes.iter().enumerate() {
            println!("📦 Vendoring Kubernetes {} schemas", source.version);
            let scratch = workspace.join(format!("kubernetes-{index}"));
            schemas.push(self.kubernetes.resolve(&source.version, &scratch)?);
        }

        for (index, source) in manifest.github.iter().enumerate() {
            println!("📦 Vendoring {}/{} {}", source.owner, source.repo, source.tag);
            let scratch = workspace.join(format!("github-{index}"));
            schemas.extend(self.github.resolve(source, &scratch).await?);
        }

        Ok(schemas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ToolOutput;
    use crate::testutil::{RecordingRunner, StaticBrowser};
    use tempfile::TempDir;

    /// Runner that seeds the output tree each resolver expects
    fn resolver_runner() -> RecordingRunner {
        RecordingRunner::new(|call| {
            let args: Vec<&str> = call.args.iter().map(|a| a.as_str()).collect();
            match args.as_slice() {
                ["mod", "init", "scratch"] => {
                    std::fs::create_dir_all(call.cwd.join("scratch/cue.mod/pkg/timoni.sh"))
                        .unwrap();
                }
                ["mod", "vendor", "k8s", ..] => {
                    std::fs::create_dir_all(call.cwd.join("cue.mod/gen/k8s.io")).unwrap();
                }
                ["mod", "vendor", "crds", ..] => {
                    std::fs::create_dir_all(call.cwd.join("cue.mod/gen/cert-manager.io")).unwrap();
                }
                _ => {}
            }
            Ok(ToolOutput::ok(""))
        })
    }

    const MANIFEST: &str = r#"
kubernetes:
  - version: 1.29.3
github:
  - tag: v1.8.0
    owner: cert-manager
    repo: cert-manager
    assets:
      - cert-manager.crds.yaml
"#;

    fn aggregator(runner: Arc<RecordingRunner>, browser: Arc<StaticBrowser>) -> VendorAggregator {
        VendorAggregator::new(ToolConfig::default(), runner, browser)
    }

    #[tokio::test]
    async fn test_aggregate_order_starts_with_timoni() {
        let workspace = TempDir::new().unwrap();
        let runner = Arc::new(resolver_runner());
        let subject = aggregator(runner, Arc::new(StaticBrowser::default()));

        let schemas = subject
            .vendor(MANIFEST.as_bytes(), workspace.path())
            .await
            .unwrap();

        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["timoni.sh", "k8s.io", "cert-manager.io"]);
    }

    #[tokio::test]
    async fn test_timoni_leads_even_for_empty_manifest() {
        let workspace = TempDir::new().unwrap();
        let runner = Arc::new(resolver_runner());
        let subject = aggregator(runner, Arc::new(StaticBrowser::default()));

        let schemas = subject
            .vendor(b"kubernetes: []\ngithub: []\n", workspace.path())
            .await
            .unwrap();

        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "timoni.sh");
    }

    #[tokio::test]
    async fn test_invalid_manifest_causes_no_activity() {
        let workspace = TempDir::new().unwrap();
        let runner = Arc::new(resolver_runner());
        let browser = Arc::new(StaticBrowser::default());
        let subject = aggregator(runner.clone(), browser.clone());

        let error = subject
            .vendor(b"gitlab: []\n", workspace.path())
            .await
            .unwrap_err();

        assert_eq!(error.code(), "MANIFEST_INVALID");
        assert!(runner.calls().is_empty());
        assert!(browser.listings().is_empty());
        assert!(browser.downloads().is_empty());
    }

    #[tokio::test]
    async fn test_first_resolver_failure_aborts_aggregate() {
        let workspace = TempDir::new().unwrap();
        // timoni.sh resolves, the Kubernetes vendor step fails
        let runner = Arc::new(RecordingRunner::new(|call| {
            let args: Vec<&str> = call.args.iter().map(|a| a.as_str()).collect();
            match args.as_slice() {
                ["mod", "init", "scratch"] => {
                    std::fs::create_dir_all(call.cwd.join("scratch/cue.mod/pkg/timoni.sh"))
                        .unwrap();
                    Ok(ToolOutput::ok(""))
                }
                ["mod", "vendor", "k8s", ..] => Ok(ToolOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: "unsupported version".to_string(),
                }),
                _ => Ok(ToolOutput::ok("")),
            }
        }));
        let subject = aggregator(runner.clone(), Arc::new(StaticBrowser::default()));

        let error = subject
            .vendor(MANIFEST.as_bytes(), workspace.path())
            .await
            .unwrap_err();

        assert_eq!(error.code(), "TOOL_FAILED");
        // The GitHub source is never reached
        assert!(
            !runner
                .calls()
                .iter()
                .any(|c| c.args.iter().any(|a| a == "crds"))
        );
    }
}
