pub mod config;
pub mod error;
pub mod manifest;
pub mod schema;

pub use config::ToolConfig;
pub use error::VendorError;
pub use manifest::{GithubSource, KubernetesSource, Manifest};
pub use schema::{RegistryCoordinate, VendoredSchema};
