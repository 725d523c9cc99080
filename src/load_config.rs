/// `load_config` module: Loads a static YAML publish config into typed structs.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file (report location, bucket, storage backend)
/// - Keep secrets out of the file: the HTTP backend reads `STORAGE_TOKEN` from the
///   environment, never from YAML
/// - Produce clear diagnostics: any failure in loading is logged and returned as
///   an `anyhow::Error` with context
///
/// # Schema
/// ```yaml
/// report:
///   destination: build/reports/tests
///   entry_point: build/reports/tests/index.html   # optional
///   root: .                                       # optional
/// upload:
///   bucket: my-bucket
///   folder: ci/1234                               # optional
/// storage:                                        # optional if given on the CLI
///   type: local
///   base_dir: ./out
/// ```
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub report: ReportSection,
    pub upload: UploadSection,
    #[serde(default)]
    pub storage: Option<StorageSection>,
}

#[derive(Debug, Deserialize)]
pub struct ReportSection {
    pub destination: PathBuf,
    #[serde(default)]
    pub entry_point: Option<PathBuf>,
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct UploadSection {
    pub bucket: String,
    #[serde(default)]
    pub folder: String,
}

/// Where objects go.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageSection {
    /// Write objects under a local directory.
    Local { base_dir: PathBuf },
    /// PUT objects to an HTTP bucket endpoint (`STORAGE_ENDPOINT` when omitted).
    Http {
        #[serde(default)]
        endpoint: Option<String>,
    },
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(
                config_path = ?path_ref,
                destination = %conf.report.destination.display(),
                bucket = %conf.upload.bucket,
                "Parsed config YAML successfully"
            );
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
