//! # contract: shared types and the object store seam
//!
//! This module holds the plain data passed between the discovery step, the upload pool
//! and the driver, plus the single trait the pipeline needs from a remote store.
//!
//! ## Interface & Extensibility
//! - Implement [`ObjectStore`] to upload somewhere new (S3, a local directory, a test double).
//! - The trait is async and returns boxed errors so any client library fits behind it.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockObjectStore` is exported with the
//!   `test-export-mocks` feature so downstream crates can use it in their tests too.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;
use tokio::fs::File;

use crate::key::default_prefix;

/// Number of upload workers when none is configured.
pub const DEFAULT_WORKER_COUNT: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Directory names skipped together with everything below them.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &[".DS_Store", ".env", ".venv", "virtualenv", "__pycache__"];

/// File names skipped wherever they appear.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[".DS_Store"];

/// Error type reported by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A single local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub path: PathBuf,
}

impl UploadTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Resolved parameters for one run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSpec {
    /// Directory whose contents are uploaded.
    pub local_root: PathBuf,
    /// Target bucket.
    pub bucket: String,
    /// Key segment placed in front of every relative path.
    pub remote_prefix: String,
    /// Number of concurrent upload workers.
    pub worker_count: NonZeroUsize,
}

impl TransferSpec {
    /// Builds a spec, falling back to the root's base name when no prefix is given.
    pub fn new(
        local_root: impl Into<PathBuf>,
        bucket: impl Into<String>,
        remote_prefix: Option<String>,
        worker_count: NonZeroUsize,
    ) -> Self {
        let local_root = local_root.into();
        let remote_prefix = match remote_prefix {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => default_prefix(&local_root),
        };
        Self {
            local_root,
            bucket: bucket.into(),
            remote_prefix,
            worker_count,
        }
    }
}

/// Base names that keep entries out of a run.
///
/// Matching is exact and only looks at the final path component. Directory names are only
/// compared against directories and file names only against everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    dirs: HashSet<String>,
    files: HashSet<String>,
}

impl ExclusionSet {
    /// An empty set: nothing is excluded.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, name: impl Into<String>) -> Self {
        self.dirs.insert(name.into());
        self
    }

    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.files.insert(name.into());
        self
    }

    pub fn excludes_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    pub fn excludes_file(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    /// The names skipped by default: OS metadata and Python environments.
    pub fn defaults() -> Self {
        let mut set = Self::new();
        set.extend_dirs(DEFAULT_EXCLUDED_DIRS.iter().copied());
        set.extend_files(DEFAULT_EXCLUDED_FILES.iter().copied());
        set
    }

    pub fn extend_dirs<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(names.into_iter().map(Into::into));
    }

    pub fn extend_files<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(names.into_iter().map(Into::into));
    }
}

/// Remote destination for uploaded files.
///
/// Implementations must be safe to call from many workers at once without extra locking.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the contents of `body` at `key` in `bucket`, privately, replacing any existing
    /// object. The handle is dropped by the time the call returns.
    async fn put(&self, bucket: &str, key: &str, body: File) -> Result<(), StoreError>;
}
