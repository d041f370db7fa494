//! Manifest Validator - Validates sources manifests before any fetch
//!
//! This module checks a raw manifest document against the fixed structural
//! schema: a mapping with ordered `kubernetes` and `github` source lists,
//! required/optional fields and types. Validation is a pure check, reports
//! the first violation with its path, and must succeed before any resolver
//! executes.
//!
//! # Example
//!
//! ```
//! use cue_vendor::validation::ManifestValidator;
//!
//! let validator = ManifestValidator::new();
//! let manifest = b"kubernetes:\n  - version: 1.29.3\n";
//!
//! assert!(validator.validate(manifest).is_ok());
//! ```

use crate::core::error::VendorError;
use serde_yaml::Value;

/// Validator for sources manifests
#[derive(Debug, Default)]
pub struct ManifestValidator;

impl ManifestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate raw manifest bytes against the structural schema
    ///
    /// Returns the first violation found. The check never touches the
    /// network or the filesystem.
    ///
    /// # Arguments
    ///
    /// * `raw` - The manifest document bytes (YAML)
    pub fn validate(&self, raw: &[u8]) -> Result<(), VendorError> {
        let doc: Value =
            serde_yaml::from_slice(raw).map_err(|source| VendorError::ManifestParse { source })?;

        let root = doc
            .as_mapping()
            .ok_or_else(|| invalid("manifest must be a mapping"))?;

        for (key, value) in root {
            match key.as_str() {
                Some("kubernetes") => validate_kubernetes(value)?,
                Some("github") => validate_github(value)?,
                Some(other) => {
                    return Err(invalid(format!("unknown top-level field '{other}'")));
                }
                None => return Err(invalid("top-level field names must be strings")),
            }
        }

        Ok(())
    }
}

fn invalid(detail: impl Into<String>) -> VendorError {
    VendorError::ManifestInvalid {
        detail: detail.into(),
    }
}

fn validate_kubernetes(value: &Value) -> Result<(), VendorError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| invalid("kubernetes: must be a list"))?;

    for (index, item) in items.iter().enumerate() {
        let path = format!("kubernetes[{index}]");
        let mapping = item
            .as_mapping()
            .ok_or_else(|| invalid(format!("{path}: must be a mapping")))?;

        require_string(mapping, &path, "version")?;

        for key in mapping.keys() {
            match key.as_str() {
                Some("version") => {}
                Some(other) => return Err(invalid(format!("{path}: unknown field '{other}'"))),
                None => return Err(invalid(format!("{path}: field names must be strings"))),
            }
        }
    }

    Ok(())
}

fn validate_github(value: &Value) -> Result<(), VendorError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| invalid("github: must be a list"))?;

    for (index, item) in items.iter().enumerate() {
        let path = format!("github[{index}]");
        let mapping = item
            .as_mapping()
            .ok_or_else(|| invalid(format!("{path}: must be a mapping")))?;

        require_string(mapping, &path, "tag")?;
        require_string(mapping, &path, "owner")?;
        require_string(mapping, &path, "repo")?;

        for (key, field) in mapping {
            match key.as_str() {
                Some("tag") | Some("owner") | Some("repo") => {}
                Some("ref") => {
                    if !field.is_string() {
                        return Err(invalid(format!("{path}.ref: must be a string")));
                    }
                }
                Some(name @ ("files" | "dirs" | "assets")) => {
                    string_list(field, &format!("{path}.{name}"))?;
                }
                Some(other) => return Err(invalid(format!("{path}: unknown field '{other}'"))),
                None => return Err(invalid(format!("{path}: field names must be strings"))),
            }
        }
    }

    Ok(())
}

fn require_string(
    mapping: &serde_yaml::Mapping,
    path: &str,
    field: &str,
) -> Result<(), VendorError> {
    match mapping.get(field) {
        Some(value) if value.is_string() => Ok(()),
        Some(_) => Err(invalid(format!("{path}.{field}: must be a string"))),
        None => Err(invalid(format!("{path}: missing required field '{field}'"))),
    }
}

fn string_list(value: &Value, path: &str) -> Result<(), VendorError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| invalid(format!("{path}: must be a list")))?;

    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Err(invalid(format!("{path}[{index}]: must be a string")));
        }
    }

    Ok(())
}
