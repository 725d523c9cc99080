///
/// This module implements the CLI interface for report-publish: command parsing,
/// merging flags with the optional YAML config, and wiring a storage backend into
/// the core publish pipeline.
///
/// All pipeline logic (entry-point selection, archiving, concurrent upload) lives
/// in the [`report-publish-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - From the shell: `report-publish publish --help`.
/// - Programmatically / in tests: call [`run`] with a constructed [`Cli`].
///
/// [`report-publish-core`]: ../../report-publish-core/
use crate::load_config::{load_config, CliConfig, StorageSection};
use crate::upload::{BucketClient, DirectoryBackend, StorageBackend};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use report_publish_core::content_type::ContentTypeTable;
use report_publish_core::publish::{publish, PublishRequest};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for report-publish: upload build reports behind a single link.
#[derive(Parser)]
#[clap(
    name = "report-publish",
    version,
    about = "Publish a build report (file or directory) to an object-storage bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a report and print the key of its entry point
    Publish(PublishArgs),
}

/// Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Report output: a single file or a directory
    #[clap(long)]
    pub destination: Option<PathBuf>,
    /// File inside the report directory that links to the rest
    #[clap(long)]
    pub entry_point: Option<PathBuf>,
    /// Directory all object keys are relative to (defaults to the working directory)
    #[clap(long)]
    pub root: Option<PathBuf>,
    /// Target bucket
    #[clap(long)]
    pub bucket: Option<String>,
    /// Key prefix inside the bucket
    #[clap(long)]
    pub folder: Option<String>,
    /// Write objects under this local directory instead of uploading
    #[clap(long, conflicts_with = "endpoint")]
    pub local_dir: Option<PathBuf>,
    /// HTTP storage endpoint (falls back to STORAGE_ENDPOINT)
    #[clap(long)]
    pub endpoint: Option<String>,
}

/// Publish request plus the storage it targets, after merging flags and config.
#[derive(Debug)]
pub struct PublishSettings {
    pub request: PublishRequest,
    pub storage: StorageSection,
}

impl PublishArgs {
    pub fn into_settings(self, config: Option<CliConfig>) -> Result<PublishSettings> {
        let (report, upload, configured_storage) = match config {
            Some(c) => (Some(c.report), Some(c.upload), c.storage),
            None => (None, None, None),
        };

        let destination = self
            .destination
            .or_else(|| report.as_ref().map(|r| r.destination.clone()))
            .context("no report destination given (use --destination or report.destination)")?;
        let entry_point_hint = self
            .entry_point
            .or_else(|| report.as_ref().and_then(|r| r.entry_point.clone()));
        let root = match self
            .root
            .or_else(|| report.as_ref().and_then(|r| r.root.clone()))
        {
            Some(root) => root,
            None => std::env::current_dir().context("cannot determine working directory")?,
        };
        let bucket = self
            .bucket
            .or_else(|| upload.as_ref().map(|u| u.bucket.clone()))
            .context("no bucket given (use --bucket or upload.bucket)")?;
        let folder = self
            .folder
            .or_else(|| upload.as_ref().map(|u| u.folder.clone()))
            .unwrap_or_default();

        let storage = match (self.local_dir, self.endpoint) {
            (Some(base_dir), _) => StorageSection::Local { base_dir },
            (None, Some(endpoint)) => StorageSection::Http {
                endpoint: Some(endpoint),
            },
            (None, None) => configured_storage.context(
                "no storage given (use --local-dir, --endpoint or a storage section)",
            )?,
        };

        Ok(PublishSettings {
            request: PublishRequest {
                destination,
                entry_point_hint,
                root,
                bucket,
                folder,
            },
            storage,
        })
    }
}

fn backend_for(storage: &StorageSection) -> Result<Arc<dyn StorageBackend>> {
    match storage {
        StorageSection::Local { base_dir } => {
            tracing::info!(base_dir = %base_dir.display(), "Using local directory storage");
            Ok(Arc::new(DirectoryBackend::new(base_dir.clone())))
        }
        StorageSection::Http { endpoint } => {
            let client = BucketClient::new_from_env(endpoint.clone())
                .map_err(|e| anyhow::anyhow!("Failed to construct storage client: {e}"))?;
            Ok(Arc::new(client))
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Publish(args) => {
            let config = match &args.config {
                Some(path) => Some(load_config(path)?),
                None => None,
            };
            let settings = args.into_settings(config)?;
            tracing::info!(command = "publish", ?settings, "Starting publish");

            let backend = backend_for(&settings.storage)?;
            match publish(
                backend,
                Arc::new(ContentTypeTable::default()),
                &settings.request,
            )
            .await
            {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publish complete");
                    println!("{}", report.entry_point_key);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e).context("Publishing report failed"))
                }
            }
        }
    }
}
