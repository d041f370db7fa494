//! CRD Exporter - Flattens GitHub CRD sources into single schema files
//!
//! A publish-independent path: for each GitHub source the same fetch targets
//! as the vendor resolver are downloaded into a scratch workspace, imported
//! as one flat CRD collection keyed by lower-cased kind and metadata name,
//! and exported as a single `{owner}-{repo}.cue` file. No registry
//! interaction and no versioning; one source's failure aborts the whole
//! export.

use crate::core::error::VendorError;
use crate::core::manifest::{GithubSource, Manifest};
use crate::security::ToolRunner;
use crate::sources::github::{RepoBrowser, build_fetch_targets};
use crate::sources::{ensure_dir, run_tool};
use crate::validation::ManifestValidator;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Exports flattened CRD schemas for every GitHub source of a manifest
pub struct CrdExporter {
    validator: ManifestValidator,
    runner: Arc<dyn ToolRunner>,
    browser: Arc<dyn RepoBrowser>,
}

impl CrdExporter {
    pub fn new(runner: Arc<dyn ToolRunner>, browser: Arc<dyn RepoBrowser>) -> Self {
        Self {
            validator: ManifestValidator::new(),
            runner,
            browser,
        }
    }

    /// Export one schema file per GitHub source into `out_dir`
    ///
    /// # Arguments
    ///
    /// * `raw` - The manifest document bytes (YAML)
    /// * `out_dir` - Output directory, created if missing
    ///
    /// Returns the written file paths in manifest order.
    pub async fn export(&self, raw: &[u8], out_dir: &Path) -> Result<Vec<PathBuf>, VendorError> {
        self.validator.validate(raw)?;
        let manifest = Manifest::from_yaml(raw)?;

        let workspace = TempDir::new()
            .map_err(|e| VendorError::io("creating scratch workspace", e))?;
        ensure_dir(out_dir)?;

        let mut outputs = Vec::new();
        for (index, source) in manifest.github.iter().enumerate() {
            println!("📤 Exporting {}/{} CRDs", source.owner, source.repo);
            let scratch = workspace.path().join(format!("export-{index}"));
            outputs.push(
                self.export_source(source, &scratch, out_dir).await?,
            );
        }

        Ok(outputs)
    }

    async fn export_source(
        &self,
        source: &GithubSource,
        scratch: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, VendorError> {
        let subject = format!("{}/{}", source.owner, source.repo);
        let targets = build_fetch_targets(source, self.browser.as_ref()).await?;

        ensure_dir(scratch)?;
        let mut taken = HashSet::new();
        for url in &targets {
            let bytes = self.browser.download(url).await?;
            let name = unique_name(&mut taken, basename(url));
            let path = scratch.join(name);
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|e| VendorError::io(format!("writing {}", path.display()), e))?;
        }

        run_tool(
            self.runner.as_ref(),
            "cue",
            &[
                "import",
                "-fl",
                "strings.ToLower(kind)",
                "-l",
                "strings.ToLower(metadata.name)",
                "-p",
                "crds",
            ],
            scratch,
            &subject,
        )?;
        run_tool(
            self.runner.as_ref(),
            "cue",
            &["export", "-e", "customresourcedefinition", "-o", "crds.cue"],
            scratch,
            &subject,
        )?;

        let out_file = out_dir.join(format!("{}-{}.cue", source.owner, source.repo));
        std::fs::copy(scratch.join("crds.cue"), &out_file)
            .map_err(|e| VendorError::io(format!("writing {}", out_file.display()), e))?;
        Ok(out_file)
    }
}

fn basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Pick a download filename, suffixing duplicates so no target is lost
fn unique_name(taken: &mut HashSet<String>, name: &str) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    for index in 1.. {
        let candidate = format!("{index}-{name}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!("suffix search always terminates");
}
