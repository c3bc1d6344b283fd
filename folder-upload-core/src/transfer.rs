//! High-level pipeline: discover files under a root and upload them through the pool.
//!
//! # Flow
//! 1. Start the [`UploadPool`] so workers are waiting before the first path appears.
//! 2. Walk the root on a blocking thread, feeding every eligible file into the intake.
//! 3. Close the intake and wait for the workers to drain it.
//!
//! # Error Handling
//! - A traversal failure aborts the run: in-flight uploads are cancelled and the error is
//!   returned to the caller.
//! - Per-file upload failures never reach the caller; workers log them and move on, so a
//!   run where every file failed still returns `Ok(())`.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::contract::{ExclusionSet, ObjectStore, TransferSpec, UploadTask};
use crate::discover::{discover, DiscoverError};
use crate::pool::UploadPool;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error("discovery thread failed: {0}")]
    DiscovererPanicked(#[source] JoinError),
}

/// Upload every eligible file under `spec.local_root` to `store`.
pub async fn transfer<S>(
    spec: Arc<TransferSpec>,
    exclusions: ExclusionSet,
    store: Arc<S>,
) -> Result<(), TransferError>
where
    S: ObjectStore + 'static,
{
    info!(
        root = %spec.local_root.display(),
        bucket = %spec.bucket,
        prefix = %spec.remote_prefix,
        workers = spec.worker_count.get(),
        "Starting transfer"
    );

    let (pool, intake) = UploadPool::spawn(Arc::clone(&spec), store);

    let root = spec.local_root.clone();
    let discovery = tokio::task::spawn_blocking(move || {
        let result = discover(&root, &exclusions, |path| {
            intake.submit_blocking(UploadTask::new(path))?;
            Ok(())
        });
        intake.close();
        result
    });

    match discovery.await {
        Ok(Ok(())) => {
            pool.join().await;
            info!(root = %spec.local_root.display(), "Transfer finished");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(
                root = %spec.local_root.display(),
                error = %e,
                "Discovery failed, aborting transfer"
            );
            pool.shutdown().await;
            Err(e.into())
        }
        Err(e) => {
            error!(
                root = %spec.local_root.display(),
                error = %e,
                "Discovery thread failed"
            );
            pool.shutdown().await;
            Err(TransferError::DiscovererPanicked(e))
        }
    }
}
