//! Remote key derivation.
//!
//! Keys always use `/` between segments, whatever the host path separator is.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("{path} contains a component that is not valid UTF-8")]
    NonUtf8 { path: PathBuf },
}

/// Default remote prefix for a root: its final path component.
///
/// Roots without a final name (`.`, `..`, `/`) give an empty prefix, so keys are the bare
/// relative paths.
pub fn default_prefix(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Key for `path` under `prefix`, relative to `root`.
///
/// Empty and `.` segments of the prefix are dropped, so `"a/"`, `"./a"` and `"a"` all give
/// the same keys.
pub fn remote_key(root: &Path, prefix: &str, path: &Path) -> Result<String, KeyError> {
    let relative = path.strip_prefix(root).map_err(|_| KeyError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let mut segments: Vec<&str> = prefix
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| KeyError::NonUtf8 {
                    path: path.to_path_buf(),
                })?;
                segments.push(name);
            }
            Component::CurDir => {}
            // `..` would step out of the root
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(KeyError::OutsideRoot {
                    path: path.to_path_buf(),
                    root: root.to_path_buf(),
                });
            }
        }
    }

    Ok(segments.join("/"))
}
