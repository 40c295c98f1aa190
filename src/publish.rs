//! File operations on the asset directory.
//!
//! The asset directory holds exactly one servable image at a time. These
//! helpers do the raw I/O; deciding *when* to call them, and holding the
//! lock while doing it, is the job of [`refresh`](crate::refresh).
//!
//! ## Atomic replacement
//!
//! [`copy_asset`] never writes to the final path directly. The source bytes
//! go to a dot-prefixed staging file first, which is then renamed over the
//! destination. A reader resolving the asset path sees either the complete
//! old file, the complete new file, or (before the first publish) nothing.

use crate::naming::{parse_asset_filename, staging_filename};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to remove {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy `src` into `asset_dir` as `filename`, replacing any existing file.
///
/// Returns the final path. On failure the staging file is cleaned up and
/// any existing file under `filename` is left as it was.
pub fn copy_asset(src: &Path, asset_dir: &Path, filename: &str) -> Result<PathBuf, PublishError> {
    let dst = asset_dir.join(filename);
    let staging = asset_dir.join(staging_filename(filename));

    let copy_err = |source: io::Error| PublishError::Copy {
        src: src.to_path_buf(),
        dst: dst.clone(),
        source,
    };

    let bytes = fs::read(src).map_err(copy_err)?;
    if let Err(e) = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, &dst)) {
        let _ = fs::remove_file(&staging);
        return Err(copy_err(e));
    }

    Ok(dst)
}

/// Remove a published asset from `asset_dir`.
pub fn remove_asset(asset_dir: &Path, filename: &str) -> Result<(), PublishError> {
    let path = asset_dir.join(filename);
    fs::remove_file(&path).map_err(|source| PublishError::Delete { path, source })
}

/// Find every file in `asset_dir` that follows the asset naming convention.
///
/// Used at startup to clean up after a previous process. Files that are not
/// assets (favicons, a README, staging leftovers) are not returned.
pub fn list_assets(asset_dir: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(asset_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| parse_asset_filename(name).is_some())
        .collect();
    names.sort();
    Ok(names)
}
