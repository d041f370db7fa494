//! Vendored schema and registry coordinate types

use crate::core::error::VendorError;
use semver::Version;
use std::borrow::Cow;
use std::path::PathBuf;

/// A vendored schema module: a name, a version and a directory of files
///
/// The directory is an immutable snapshot owned by the pipeline run's scratch
/// workspace. A schema is created once per resolution and never mutated in
/// place; the import rewriter produces a new snapshot instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendoredSchema {
    /// Module namespace, e.g. `k8s.io`, `timoni.sh` or a GitHub-derived name
    pub name: String,
    /// Source tag or resolved Kubernetes version
    pub version: String,
    /// Snapshot of the fetched or generated files
    pub directory: PathBuf,
}

impl VendoredSchema {
    pub fn new(name: impl Into<String>, version: impl Into<String>, directory: PathBuf) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            directory,
        }
    }

    /// Parse the schema version as semver, tolerating a leading `v` and
    /// missing components
    pub fn semantic_version(&self) -> Result<Version, VendorError> {
        parse_version(&self.name, &self.version)
    }
}

/// Parse a version string as semver, tolerating a leading `v` and missing
/// minor/patch components the way Git tags and Kubernetes API lines are
/// commonly written (`v1.8`, `1.29`)
pub fn parse_version(subject: &str, version: &str) -> Result<Version, VendorError> {
    let padded = pad_components(version.trim_start_matches('v'));
    Version::parse(&padded).map_err(|source| VendorError::InvalidVersion {
        subject: subject.to_string(),
        version: version.to_string(),
        source,
    })
}

/// Pad a `major` or `major.minor` core to three components, leaving any
/// pre-release or build suffix in place
fn pad_components(version: &str) -> Cow<'_, str> {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    match core.split('.').count() {
        1 => Cow::Owned(format!("{core}.0.0{suffix}")),
        2 => Cow::Owned(format!("{core}.0{suffix}")),
        _ => Cow::Borrowed(version),
    }
}

/// The registry identity a schema is published under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCoordinate {
    pub owner: String,
    pub repo: String,
    pub name: String,
    pub major: u64,
}

impl RegistryCoordinate {
    /// Derive the coordinate for a schema from its semantic version
    pub fn for_schema(
        schema: &VendoredSchema,
        owner: &str,
        repo: &str,
    ) -> Result<Self, VendorError> {
        let version = schema.semantic_version()?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            name: schema.name.clone(),
            major: version.major,
        })
    }

    /// Full module path including the major-version suffix
    ///
    /// Used as the module-init identity at publish time.
    pub fn module_path(&self) -> String {
        format!(
            "github.com/{}/{}/{}@v{}",
            self.owner, self.repo, self.name, self.major
        )
    }

    /// Import prefix without the version suffix
    ///
    /// Replaces the schema's bare name in import references.
    pub fn import_prefix(&self) -> String {
        format!("github.com/{}/{}/{}", self.owner, self.repo, self.name)
    }
}
