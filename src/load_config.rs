//! `load_config` module: turns parsed arguments and the environment into the resolved run
//! configuration.
//!
//! # Responsibilities
//! - Reject empty required values that clap lets through (`--bucket ""`, `--path ""`)
//! - Apply the remote prefix default (the folder's base name)
//! - Merge extra exclusions from the command line into the default set
//! - Resolve the AWS region from `AWS_REGION`, falling back to [`DEFAULT_REGION`]
//!
//! # Errors
//! All errors use `anyhow::Error` and surface at the CLI boundary, before any upload starts.

use anyhow::{bail, Result};
use folder_upload_core::{ExclusionSet, TransferSpec};
use tracing::{error, info};

use crate::cli::Cli;

/// Environment variable holding the target region.
pub const REGION_ENV: &str = "AWS_REGION";

/// Region used when the environment does not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Everything a run needs, resolved before the pipeline starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub spec: TransferSpec,
    pub exclusions: ExclusionSet,
    pub region: String,
}

/// Resolve the run configuration from `cli` and the process environment.
pub fn load_config(cli: &Cli) -> Result<RunConfig> {
    resolve_config(cli, std::env::var(REGION_ENV).ok())
}

/// Same as [`load_config`] with the region value passed in explicitly.
pub fn resolve_config(cli: &Cli, region: Option<String>) -> Result<RunConfig> {
    if cli.path.as_os_str().is_empty() {
        error!("Local folder path is empty");
        bail!("--path must name a local folder");
    }
    if cli.bucket.trim().is_empty() {
        error!("Bucket name is empty");
        bail!("--bucket must name an S3 bucket");
    }

    let spec = TransferSpec::new(
        cli.path.clone(),
        cli.bucket.clone(),
        cli.base_folder_s3.clone(),
        cli.workers,
    );

    let mut exclusions = ExclusionSet::defaults();
    exclusions.extend_dirs(cli.exclude_dirs.iter().cloned());
    exclusions.extend_files(cli.exclude_files.iter().cloned());

    let region = resolve_region(region);
    info!(
        prefix = %spec.remote_prefix,
        workers = spec.worker_count.get(),
        region = %region,
        "Config loaded and merged successfully"
    );

    Ok(RunConfig {
        spec,
        exclusions,
        region,
    })
}

/// The region to use given the raw `AWS_REGION` value; unset and blank both fall back.
pub fn resolve_region(value: Option<String>) -> String {
    match value {
        Some(region) if !region.trim().is_empty() => region,
        _ => DEFAULT_REGION.to_string(),
    }
}
