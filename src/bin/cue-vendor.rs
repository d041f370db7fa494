//! cue-vendor CLI
//!
//! Manifest-driven vendoring, publishing and exporting of CUE schemas

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cue_vendor::{
    CrdExporter, GithubClient, ManifestValidator, SafeCommandExecutor, SchemaPublisher,
    ToolConfig, VendorAggregator,
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Environment variable the registry token is read from
const TOKEN_VAR: &str = "CUE_TOKEN";

/// Manifest-driven CUE schema vendoring and publishing
#[derive(Parser)]
#[command(name = "cue-vendor")]
#[command(version = "0.1.0")]
#[command(about = "Vendor, publish and export CUE schemas from a sources manifest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// cue version expected on the PATH
    #[arg(long, global = true, default_value = "latest")]
    cue_version: String,

    /// timoni version expected on the PATH
    #[arg(long, global = true, default_value = "latest")]
    timoni_version: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sources manifest
    Validate {
        /// Path to the sources.yaml file
        #[arg(value_name = "SOURCES")]
        sources: PathBuf,
    },

    /// Vendor every schema the manifest names and list the results
    Vendor {
        /// Path to the sources.yaml file
        #[arg(value_name = "SOURCES")]
        sources: PathBuf,
    },

    /// Vendor, rewrite and publish every schema to the central registry
    Publish {
        /// Path to the sources.yaml file
        #[arg(value_name = "SOURCES")]
        sources: PathBuf,

        /// Registry owner to publish under
        #[arg(long)]
        owner: String,

        /// Registry repository to publish under
        #[arg(long)]
        repo: String,
    },

    /// Export one flattened CRD schema file per GitHub source
    Export {
        /// Path to the sources.yaml file
        #[arg(value_name = "SOURCES")]
        sources: PathBuf,

        /// Output directory for the exported schema files
        #[arg(long, default_value = "crds")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let config = ToolConfig {
        cue_version: cli.cue_version.clone(),
        timoni_version: cli.timoni_version.clone(),
    };
    let runner = Arc::new(SafeCommandExecutor::new());
    let browser = Arc::new(GithubClient::new());

    match cli.command {
        Commands::Validate { sources } => {
            let raw = read_manifest(&sources).await?;
            ManifestValidator::new().validate(&raw)?;
            println!("✅ {} is valid", sources.display());
            Ok(0)
        }

        Commands::Vendor { sources } => {
            let raw = read_manifest(&sources).await?;
            let workspace = tempfile::TempDir::new().context("creating scratch workspace")?;

            let aggregator = VendorAggregator::new(config, runner, browser);
            let schemas = aggregator.vendor(&raw, workspace.path()).await?;

            println!("\n✅ Vendored {} schemas:", schemas.len());
            for schema in &schemas {
                println!("  - {}@{}", schema.name, schema.version);
            }
            Ok(0)
        }

        Commands::Publish {
            sources,
            owner,
            repo,
        } => {
            let raw = read_manifest(&sources).await?;
            let token = registry_token()?;

            let publisher = SchemaPublisher::new(config, runner, browser);
            let report = publisher.publish(&raw, &owner, &repo, &token).await?;

            print!("{}", report.output);
            if report.success() {
                println!("\n✅ Published {} schemas", report.published.len());
                Ok(0)
            } else {
                if let Some(failure) = &report.failed {
                    eprintln!(
                        "\n❌ Publishing stopped at {}: {}",
                        failure.schema, failure.error
                    );
                }
                eprintln!("Published before the failure: {}", report.published.len());
                Ok(1)
            }
        }

        Commands::Export { sources, out } => {
            let raw = read_manifest(&sources).await?;

            let exporter = CrdExporter::new(runner, browser);
            let outputs = exporter.export(&raw, &out).await?;

            println!("\n✅ Exported {} schema files:", outputs.len());
            for output in &outputs {
                println!("  - {}", output.display());
            }
            Ok(0)
        }
    }
}

async fn read_manifest(path: &PathBuf) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("reading manifest {}", path.display()))
}

/// Read the registry token from the environment into a secret
fn registry_token() -> Result<SecretString> {
    let value = std::env::var(TOKEN_VAR)
        .with_context(|| format!("the {TOKEN_VAR} environment variable must hold the registry token"))?;
    Ok(SecretString::new(value.into()))
}
