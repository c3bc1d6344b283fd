//! Depth-first discovery of the files to upload.
//!
//! The walk runs synchronously on whatever thread calls [`discover`]; the driver puts it on
//! a blocking thread so that `emit` may park until a worker is ready.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::contract::ExclusionSet;
use crate::pool::IntakeClosed;

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("discovery stopped early: {0}")]
    IntakeClosed(#[from] IntakeClosed),
}

/// Walk `root` and call `emit` once for every file that survives `exclusions`.
///
/// Directories whose base name is excluded are not descended into, the root included.
/// Symbolic links are not followed. The first entry that cannot be read ends the walk with
/// an error, as does an `emit` failure.
pub fn discover<F>(
    root: &Path,
    exclusions: &ExclusionSet,
    mut emit: F,
) -> Result<(), DiscoverError>
where
    F: FnMut(PathBuf) -> Result<(), DiscoverError>,
{
    let mut emitted = 0usize;
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|source| DiscoverError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            if exclusions.excludes_dir(&entry.file_name().to_string_lossy()) {
                debug!(path = %entry.path().display(), "Skipping excluded directory");
                walker.skip_current_dir();
            }
            continue;
        }

        if exclusions.excludes_file(&entry.file_name().to_string_lossy()) {
            debug!(path = %entry.path().display(), "Skipping excluded file");
            continue;
        }

        emit(entry.into_path())?;
        emitted += 1;
    }

    info!(root = %root.display(), files = emitted, "Discovery finished");
    Ok(())
}
