//! GitHub source resolver
//!
//! Builds a flat list of fetch targets from a source descriptor (explicit
//! files, directory listings filtered to YAML entries, release assets), feeds
//! every target through `timoni mod vendor crds`, and turns each top-level
//! entry of the resulting module tree into a separate vendored schema.

use crate::core::error::VendorError;
use crate::core::manifest::GithubSource;
use crate::core::schema::VendoredSchema;
use crate::security::ToolRunner;
use crate::sources::{ensure_dir, run_tool};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// One entry of a repository directory listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    /// Direct download URL; absent for subdirectories
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Narrow interface to the repository host
///
/// Implemented by [`GithubClient`] against the real hosting API and by
/// static fakes in tests.
#[async_trait]
pub trait RepoBrowser: Send + Sync {
    /// List a repository directory at the given ref
    async fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<ContentEntry>, VendorError>;

    /// Download a file, returning its raw bytes
    async fn download(&self, url: &str) -> Result<Vec<u8>, VendorError>;
}

/// GitHub API client for directory listings and artifact downloads
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
}

const USER_AGENT: &str = concat!("cue-vendor/", env!("CARGO_PKG_VERSION"));

impl GithubClient {
    pub fn new() -> Self {
        Self::with_api_base("https://api.github.com")
    }

    /// Client against an alternate API base, e.g. a local stub server
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoBrowser for GithubClient {
    async fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<ContentEntry>, VendorError> {
        let listing_error = |message: String| VendorError::DirectoryListing {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            message,
        };

        let url = format!(
            "{}/repos/{owner}/{repo}/contents/{path}?ref={reference}",
            self.api_base
        );
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| listing_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(listing_error(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| listing_error(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| listing_error(e.to_string()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, VendorError> {
        let download_error = |message: String| VendorError::Download {
            url: url.to_string(),
            message,
        };

        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn raw_content_url(owner: &str, repo: &str, reference: &str, path: &str) -> String {
    format!("https://raw.githubusercontent.com/{owner}/{repo}/refs/tags/{reference}/{path}")
}

fn release_asset_url(owner: &str, repo: &str, reference: &str, asset: &str) -> String {
    format!("https://github.com/{owner}/{repo}/releases/download/{reference}/{asset}")
}

fn is_yaml(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

/// Build the ordered fetch-target URLs for a GitHub source
///
/// Targets are produced in file-list, then directory-list (each directory's
/// entries in listing order), then asset-list order. Non-YAML directory
/// entries are silently skipped. A failed directory listing aborts the whole
/// source.
pub async fn build_fetch_targets(
    source: &GithubSource,
    browser: &dyn RepoBrowser,
) -> Result<Vec<String>, VendorError> {
    let reference = source.effective_ref();
    let mut targets = Vec::new();

    for file in &source.files {
        targets.push(raw_content_url(&source.owner, &source.repo, reference, file));
    }

    for dir in &source.dirs {
        let entries = browser
            .list_dir(&source.owner, &source.repo, dir, reference)
            .await?;
        for entry in entries {
            if !is_yaml(&entry.name) {
                continue;
            }
            if let Some(url) = entry.download_url {
                targets.push(url);
            }
        }
    }

    for asset in &source.assets {
        targets.push(release_asset_url(
            &source.owner,
            &source.repo,
            reference,
            asset,
        ));
    }

    Ok(targets)
}

/// Resolver for GitHub-hosted CRD schemas
pub struct GithubResolver {
    runner: Arc<dyn ToolRunner>,
    browser: Arc<dyn RepoBrowser>,
}

impl GithubResolver {
    pub fn new(runner: Arc<dyn ToolRunner>, browser: Arc<dyn RepoBrowser>) -> Self {
        Self { runner, browser }
    }

    /// Resolve one source descriptor into zero or more vendored schemas
    ///
    /// Every fetch target is vendored into one shared module; afterwards the
    /// generated tree is scanned one level deep and each top-level entry
    /// becomes a schema versioned with the source tag.
    ///
    /// # Arguments
    ///
    /// * `source` - The descriptor to resolve
    /// * `scratch` - Per-source scratch directory, created if missing
    pub async fn resolve(
        &self,
        source: &GithubSource,
        scratch: &Path,
    ) -> Result<Vec<VendoredSchema>, VendorError> {
        let subject = format!("{}/{}", source.owner, source.repo);
        let targets = build_fetch_targets(source, self.browser.as_ref()).await?;

        ensure_dir(scratch)?;
        run_tool(self.runner.as_ref(), "cue", &["mod", "init"], scratch, &subject)?;
        for url in &targets {
            run_tool(
                self.runner.as_ref(),
                "timoni",
                &["mod", "vendor", "crds", "-f", url],
                scratch,
                &subject,
            )?;
        }

        let gen_dir = scratch.join("cue.mod").join("gen");
        if !gen_dir.is_dir() {
            // No target produced any schema module
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let entries = std::fs::read_dir(&gen_dir)
            .map_err(|e| VendorError::io(format!("reading {}", gen_dir.display()), e))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| VendorError::io(format!("reading {}", gen_dir.display()), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                let directory = gen_dir.join(&name);
                VendoredSchema::new(name, source.tag.clone(), directory)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{RecordingRunner, StaticBrowser};
    use tempfile::TempDir;

    fn source(files: &[&str], dirs: &[&str], assets: &[&str]) -> GithubSource {
        GithubSource {
            tag: "v1.8.0".to_string(),
            reference: None,
            owner: "cert-manager".to_string(),
            repo: "cert-manager".to_string(),
            files: files.iter().map(|s| s.to_string()).collect(),
            dirs: dirs.iter().map(|s| s.to_string()).collect(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_targets_use_tag_when_ref_absent() {
        let browser = StaticBrowser::default();
        let descriptor = source(&["deploy/crds.yaml"], &[], &["cert-manager.crds.yaml"]);

        let targets = build_fetch_targets(&descriptor, &browser).await.unwrap();

        assert_eq!(
            targets,
            vec![
                "https://raw.githubusercontent.com/cert-manager/cert-manager/refs/tags/v1.8.0/deploy/crds.yaml",
                "https://github.com/cert-manager/cert-manager/releases/download/v1.8.0/cert-manager.crds.yaml",
            ]
        );
    }

    #[tokio::test]
    async fn test_targets_use_explicit_ref() {
        let browser = StaticBrowser::default();
        let mut descriptor = source(&["crds.yaml"], &[], &[]);
        descriptor.reference = Some("release-1.8".to_string());

        let targets = build_fetch_targets(&descriptor, &browser).await.unwrap();

        assert_eq!(targets.len(), 1);
        assert!(targets[0].contains("/refs/tags/release-1.8/"));
    }

    #[tokio::test]
    async fn test_directory_entries_filtered_to_yaml() {
        let mut browser = StaticBrowser::default();
        browser.add_dir(
            "cert-manager/cert-manager/config/crd@v1.8.0",
            vec![
                ("a.yaml", Some("https://example.test/a.yaml")),
                ("b.txt", Some("https://example.test/b.txt")),
                ("c.yml", Some("https://example.test/c.yml")),
            ],
        );
        let descriptor = source(&[], &["config/crd"], &[]);

        let targets = build_fetch_targets(&descriptor, &browser).await.unwrap();

        assert_eq!(
            targets,
            vec!["https://example.test/a.yaml", "https://example.test/c.yml"]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_source() {
        let browser = StaticBrowser::default();
        let descriptor = source(&["crds.yaml"], &["missing/dir"], &[]);

        let error = build_fetch_targets(&descriptor, &browser).await.unwrap_err();

        assert_eq!(error.code(), "DIRECTORY_LISTING");
    }

    #[tokio::test]
    async fn test_resolve_splits_generated_tree() {
        let workspace = TempDir::new().unwrap();
        let runner = RecordingRunner::seeding_dirs(vec![
            "cue.mod/gen/cert-manager.io".to_string(),
            "cue.mod/gen/acme.cert-manager.io".to_string(),
        ]);
        let runner = Arc::new(runner);
        let resolver = GithubResolver::new(runner.clone(), Arc::new(StaticBrowser::default()));
        let descriptor = source(&[], &[], &["cert-manager.crds.yaml"]);

        let schemas = resolver
            .resolve(&descriptor, &workspace.path().join("github-0"))
            .await
            .unwrap();

        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name, "acme.cert-manager.io");
        assert_eq!(schemas[1].name, "cert-manager.io");
        assert!(schemas.iter().all(|s| s.version == "v1.8.0"));

        let calls = runner.calls();
        assert_eq!(calls[0].args, vec!["mod", "init"]);
        assert!(
            calls[1]
                .args
                .contains(&"https://github.com/cert-manager/cert-manager/releases/download/v1.8.0/cert-manager.crds.yaml".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_with_no_targets_yields_nothing() {
        let workspace = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::succeeding());
        let resolver = GithubResolver::new(runner.clone(), Arc::new(StaticBrowser::default()));
        let descriptor = source(&[], &[], &[]);

        let schemas = resolver
            .resolve(&descriptor, &workspace.path().join("github-0"))
            .await
            .unwrap();

        assert!(schemas.is_empty());
        // Only the module init runs
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_vendor_tool_failure_propagates() {
        let workspace = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::failing_on("timoni", "no CRDs found"));
        let resolver = GithubResolver::new(runner, Arc::new(StaticBrowser::default()));
        let descriptor = source(&["crds.yaml"], &[], &[]);

        let error = resolver
            .resolve(&descriptor, &workspace.path().join("github-0"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), "TOOL_FAILED");
        assert!(error.to_string().contains("cert-manager/cert-manager"));
    }
}
