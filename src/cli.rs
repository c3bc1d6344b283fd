//!
//! Command line interface for folder-upload: argument parsing and the async entrypoint.
//!
//! All pipeline logic (discovery, the worker pool, key derivation) lives in
//! [`folder_upload_core`]. This module only turns arguments into a run:
//! resolve configuration, connect to S3, hand off to [`transfer`], report the outcome.
//!
//! ## How To Use
//! - From a shell: `folder-upload --path ./site --bucket my-bucket [-t 10] [--base-folder-s3 www]`
//! - Programmatically or from tests: build a [`Cli`] and call [`run`], or [`run_with_store`]
//!   to upload somewhere other than S3.
//!
//! ## Exit behaviour
//! Configuration, credential and traversal problems end the run with an error. Files that
//! fail to upload are only logged; the run still completes and prints its success line.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use folder_upload_core::contract::DEFAULT_WORKER_COUNT;
use folder_upload_core::{transfer, ObjectStore};

use crate::load_config::{load_config, RunConfig};
use crate::upload::S3Store;

/// Printed once every worker has drained the intake.
pub const COMPLETION_MESSAGE: &str = "Upload completed successfully.";

/// CLI for folder-upload: mirror a local directory into an S3 bucket.
#[derive(Parser, Debug)]
#[clap(
    name = "folder-upload",
    version,
    about = "Upload a local folder to an S3 bucket using concurrent workers"
)]
pub struct Cli {
    /// Local folder path to upload
    #[clap(long)]
    pub path: PathBuf,

    /// S3 bucket name
    #[clap(long)]
    pub bucket: String,

    /// Number of concurrent workers
    #[clap(short = 't', long = "workers", default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: NonZeroUsize,

    /// Base path in the bucket; defaults to the folder's own name
    #[clap(long = "base-folder-s3", visible_alias = "prefix")]
    pub base_folder_s3: Option<String>,

    /// Additional directory name to skip, with everything below it (repeatable)
    #[clap(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Additional file name to skip (repeatable)
    #[clap(long = "exclude-file", value_name = "NAME")]
    pub exclude_files: Vec<String>,
}

/// Async entrypoint for `main`: uploads through S3 and reports on stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let store = S3Store::from_region(&config.region).await?;
    upload(config, Arc::new(store), &mut io::stdout()).await
}

/// Same as [`run`] with the store and the output supplied by the caller.
pub async fn run_with_store<S, W>(cli: Cli, store: Arc<S>, out: &mut W) -> Result<()>
where
    S: ObjectStore + 'static,
    W: Write,
{
    let config = load_config(&cli)?;
    upload(config, store, out).await
}

async fn upload<S, W>(config: RunConfig, store: Arc<S>, out: &mut W) -> Result<()>
where
    S: ObjectStore + 'static,
    W: Write,
{
    tracing::info!(
        root = %config.spec.local_root.display(),
        bucket = %config.spec.bucket,
        region = %config.region,
        "Configuration resolved"
    );

    transfer(Arc::new(config.spec), config.exclusions, store)
        .await
        .context("Failed to walk through the local folder")?;

    writeln!(out, "{COMPLETION_MESSAGE}")?;
    Ok(())
}
