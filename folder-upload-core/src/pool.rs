//! Fixed-size pool of upload workers fed through a shared intake.
//!
//! Every worker pulls from the same bounded channel, so each task goes to exactly one of
//! them. Producers block on a full intake; that is the only flow control between discovery
//! and uploading.
//!
//! Per-file failures are logged by the worker that hit them and then dropped. Nothing is
//! retried and no failure stops a worker or the pool.

use std::path::PathBuf;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use thiserror::Error;
use tokio::fs::File;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::contract::{ObjectStore, StoreError, TransferSpec, UploadTask};
use crate::key::{remote_key, KeyError};

/// Tasks the intake holds before a producer has to wait. `async-channel` has no
/// zero-capacity mode, so one slot is the tightest handoff available.
pub const INTAKE_CAPACITY: usize = 1;

/// Why a single file did not make it to the store.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("failed to put {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Returned by the intake once no worker can receive anymore. Carries the rejected task.
#[derive(Debug, Error)]
#[error("upload intake is closed, {} was not queued", .0.path.display())]
pub struct IntakeClosed(pub UploadTask);

/// Producer side of the pool. Cheap to clone; the pool sees end of input once
/// [`Intake::close`] is called or every clone is dropped.
#[derive(Debug, Clone)]
pub struct Intake {
    tx: Sender<UploadTask>,
}

impl Intake {
    /// Queue a task, waiting for a free slot.
    pub async fn submit(&self, task: UploadTask) -> Result<(), IntakeClosed> {
        self.tx.send(task).await.map_err(|e| IntakeClosed(e.into_inner()))
    }

    /// Queue a task from a non-async thread, parking it until a slot is free.
    ///
    /// Must not be called from inside an async task.
    pub fn submit_blocking(&self, task: UploadTask) -> Result<(), IntakeClosed> {
        self.tx
            .send_blocking(task)
            .map_err(|e| IntakeClosed(e.into_inner()))
    }

    /// Mark the end of input. Workers finish what is queued and then exit.
    pub fn close(&self) {
        self.tx.close();
    }
}

/// Handle on the running workers.
pub struct UploadPool {
    workers: JoinSet<()>,
}

impl UploadPool {
    /// Start `spec.worker_count` workers uploading into `store`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S>(spec: Arc<TransferSpec>, store: Arc<S>) -> (Self, Intake)
    where
        S: ObjectStore + 'static,
    {
        let (tx, rx) = async_channel::bounded(INTAKE_CAPACITY);
        let mut workers = JoinSet::new();

        for id in 0..spec.worker_count.get() {
            workers.spawn(run_worker(
                id,
                rx.clone(),
                Arc::clone(&spec),
                Arc::clone(&store),
            ));
        }

        info!(
            workers = spec.worker_count.get(),
            bucket = %spec.bucket,
            prefix = %spec.remote_prefix,
            "Upload pool started"
        );
        (UploadPool { workers }, Intake { tx })
    }

    /// Wait until the intake is closed and drained and every worker has exited.
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Upload worker terminated abnormally");
            }
        }
        info!("Upload pool drained");
    }

    /// Abort all workers, including uploads in flight, and wait for them to stop.
    pub async fn shutdown(mut self) {
        self.workers.shutdown().await;
        info!("Upload pool shut down");
    }
}

async fn run_worker<S>(
    id: usize,
    intake: Receiver<UploadTask>,
    spec: Arc<TransferSpec>,
    store: Arc<S>,
) where
    S: ObjectStore + ?Sized,
{
    while let Ok(task) = intake.recv().await {
        info!(worker = id, path = %task.path.display(), "Uploading file");
        match upload_file(store.as_ref(), &spec, &task).await {
            Ok(key) => debug!(worker = id, key = %key, "Uploaded file"),
            Err(e) => error!(
                worker = id,
                path = %task.path.display(),
                error = %e,
                "Failed to upload file"
            ),
        }
    }
    debug!(worker = id, "Intake closed, worker exiting");
}

/// Upload one file and return the key it was stored under.
///
/// The file is opened before the key is computed and is closed on every path out of this
/// function.
pub async fn upload_file<S>(
    store: &S,
    spec: &TransferSpec,
    task: &UploadTask,
) -> Result<String, UploadError>
where
    S: ObjectStore + ?Sized,
{
    let file = File::open(&task.path)
        .await
        .map_err(|source| UploadError::Open {
            path: task.path.clone(),
            source,
        })?;
    let key = remote_key(&spec.local_root, &spec.remote_prefix, &task.path)?;

    store
        .put(&spec.bucket, &key, file)
        .await
        .map_err(|source| UploadError::Store {
            key: key.clone(),
            source,
        })?;
    Ok(key)
}
