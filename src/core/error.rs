//! Error handling for the schema vendoring pipeline
//!
//! This module provides the typed error surface of the library using the
//! thiserror crate. Every failure names the source or schema it belongs to
//! so that a batch failure can be diagnosed without re-running the pipeline.

use crate::security::CommandError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vendoring, publishing and exporting operations
#[derive(Error, Debug)]
pub enum VendorError {
    // Manifest errors
    #[error("manifest validation failed: {detail}")]
    ManifestInvalid { detail: String },

    #[error("manifest could not be parsed")]
    ManifestParse {
        #[source]
        source: serde_yaml::Error,
    },

    // Resolution errors
    #[error("[{subject}] invalid semantic version '{version}'")]
    InvalidVersion {
        subject: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("[{owner}/{repo}] listing directory '{path}' failed: {message}")]
    DirectoryListing {
        owner: String,
        repo: String,
        path: String,
        message: String,
    },

    #[error("downloading '{url}' failed: {message}")]
    Download { url: String, message: String },

    // External tool errors
    #[error("[{subject}] {tool} exited with an error: {stderr}")]
    ToolFailed {
        tool: String,
        subject: String,
        stderr: String,
    },

    #[error("[{subject}] expected tool output missing at {path}")]
    MissingOutput { subject: String, path: PathBuf },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl VendorError {
    /// Wrap an I/O error with a human-readable context line
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get a stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestInvalid { .. } => "MANIFEST_INVALID",
            Self::ManifestParse { .. } => "MANIFEST_PARSE",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::DirectoryListing { .. } => "DIRECTORY_LISTING",
            Self::Download { .. } => "DOWNLOAD",
            Self::ToolFailed { .. } => "TOOL_FAILED",
            Self::MissingOutput { .. } => "MISSING_OUTPUT",
            Self::Command(_) => "COMMAND",
            Self::Io { .. } => "IO",
        }
    }
}
