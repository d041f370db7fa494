//! Configuration for the vendoring pipeline
//!
//! This module provides type-safe, immutable tool configuration with serde
//! support. A `ToolConfig` is handed to the pipeline at construction; each
//! pipeline instance is independently configurable.

use serde::{Deserialize, Serialize};

/// Versions of the external schema tools the pipeline drives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// cue version expected on the PATH (default: "latest")
    #[serde(default = "default_version")]
    pub cue_version: String,

    /// timoni version expected on the PATH (default: "latest")
    ///
    /// Also used as the module version of the fixed `timoni.sh` schema.
    #[serde(default = "default_version")]
    pub timoni_version: String,
}

fn default_version() -> String {
    "latest".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cue_version: default_version(),
            timoni_version: default_version(),
        }
    }
}
