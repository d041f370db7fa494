//! Import Path Rewriter - Moves a schema module under a registry coordinate
//!
//! Rewriting copies the vendored tree into a fresh snapshot, re-initializes
//! the module identity under `github.com/{owner}/{repo}/{name}@v{major}`, and
//! replaces every file's textual `"{name}` import prefix with the full
//! coordinate. The original snapshot is never touched, so a failed rewrite
//! leaves nothing in a publishable state.

use crate::core::error::VendorError;
use crate::core::schema::{RegistryCoordinate, VendoredSchema};
use crate::security::ToolRunner;
use crate::sources::{ensure_dir, run_tool};
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Rewrites a vendored schema's import coordinates
pub struct ImportPathRewriter {
    runner: Arc<dyn ToolRunner>,
}

impl ImportPathRewriter {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Produce a new snapshot of `schema` under `coordinate`
    ///
    /// # Arguments
    ///
    /// * `schema` - The vendored schema to rewrite (left untouched)
    /// * `coordinate` - The registry identity to move the module under
    /// * `scratch` - Directory the new snapshot is built in
    pub fn rewrite(
        &self,
        schema: &VendoredSchema,
        coordinate: &RegistryCoordinate,
        scratch: &Path,
    ) -> Result<VendoredSchema, VendorError> {
        copy_tree(&schema.directory, scratch)?;

        run_tool(
            self.runner.as_ref(),
            "cue",
            &["mod", "init", &coordinate.module_path(), "--source=self"],
            scratch,
            &schema.name,
        )?;

        rewrite_imports(scratch, &schema.name, &coordinate.import_prefix())?;

        Ok(VendoredSchema::new(
            schema.name.clone(),
            schema.version.clone(),
            scratch.to_path_buf(),
        ))
    }
}

fn walk_error(root: &Path, error: walkdir::Error) -> VendorError {
    let context = format!("walking {}", root.display());
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
    VendorError::io(context, source)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), VendorError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| walk_error(from, e))?;
        let relative = entry.path().strip_prefix(from).map_err(|e| {
            VendorError::io(format!("walking {}", from.display()), std::io::Error::other(e))
        })?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| VendorError::io(format!("copying to {}", target.display()), e))?;
        }
    }
    Ok(())
}

/// Replace the quoted bare-name import prefix in every file of the tree
fn rewrite_imports(root: &Path, name: &str, prefix: &str) -> Result<(), VendorError> {
    let needle = format!("\"{name}");
    let replacement = format!("\"{prefix}");

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let contents = std::fs::read(path)
            .map_err(|e| VendorError::io(format!("reading {}", path.display()), e))?;
        // Schema trees are text; anything non-UTF-8 holds no import references
        let Ok(text) = String::from_utf8(contents) else {
            continue;
        };

        if text.contains(&needle) {
            let rewritten = text.replace(&needle, &replacement);
            std::fs::write(path, rewritten)
                .map_err(|e| VendorError::io(format!("writing {}", path.display()), e))?;
        }
    }

    Ok(())
}
