//! Typed model of a sources manifest
//!
//! A manifest is a YAML document with two ordered lists: Kubernetes version
//! requests and GitHub source descriptors. Raw documents are checked by the
//! `ManifestValidator` first; all downstream code operates on this typed
//! model, never on untyped YAML values.

use crate::core::error::VendorError;
use serde::{Deserialize, Serialize};

/// A sources manifest listing the schemas to vendor, publish or export
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Kubernetes API versions to vendor (ordered)
    #[serde(default)]
    pub kubernetes: Vec<KubernetesSource>,

    /// GitHub-hosted CRD sources to vendor (ordered)
    #[serde(default)]
    pub github: Vec<GithubSource>,
}

/// A single Kubernetes API version request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KubernetesSource {
    /// Semantic version string; only major.minor is significant
    pub version: String,
}

/// A GitHub source descriptor
///
/// At least one of `files`, `dirs` or `assets` should be non-empty for useful
/// output. An empty descriptor yields zero fetch targets, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubSource {
    /// Tag the vendored schemas are versioned with
    pub tag: String,

    /// Git ref to fetch from (defaults to `tag` when absent)
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Repository file paths to fetch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Repository directories whose YAML entries are fetched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<String>,

    /// Release asset names to fetch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

impl GithubSource {
    /// The ref used for every URL constructed from this source
    pub fn effective_ref(&self) -> &str {
        match self.reference.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => &self.tag,
        }
    }
}

impl Manifest {
    /// Deserialize a manifest that already passed structural validation
    pub fn from_yaml(raw: &[u8]) -> Result<Self, VendorError> {
        serde_yaml::from_slice(raw).map_err(|source| VendorError::ManifestParse { source })
    }
}
