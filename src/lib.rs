pub mod core;
pub mod orchestration;
pub mod security;
pub mod sources;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::core::{
    GithubSource, KubernetesSource, Manifest, RegistryCoordinate, ToolConfig, VendorError,
    VendoredSchema,
};
pub use crate::orchestration::{
    CrdExporter, ImportPathRewriter, PublishFailure, PublishReport, SchemaPublisher,
    VendorAggregator,
};
pub use crate::security::{CommandError, SafeCommandExecutor, ToolOutput, ToolRunner};
pub use crate::sources::{
    GithubClient, GithubResolver, KubernetesResolver, RepoBrowser, TimoniResolver,
};
pub use crate::validation::ManifestValidator;
