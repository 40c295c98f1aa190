//! Shared test utilities for the daily-image test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = image_dir(&["a.jpg", "b.jpg"]);
//! let pool = scan_pool(tmp.path()).unwrap();
//! assert_eq!(pool_names(&pool), vec!["a.jpg", "b.jpg"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::naming::parse_asset_filename;
use crate::scan::ImagePool;

// =========================================================================
// Fixture setup
// =========================================================================

/// Bytes written for a fixture image. Unique per name so tests can tell
/// which source an asset was copied from.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    format!("jpeg-bytes:{name}").into_bytes()
}

/// Create a temp directory containing one file per name.
pub fn image_dir(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        std::fs::write(tmp.path().join(name), fixture_bytes(name)).unwrap();
    }
    tmp
}

// =========================================================================
// Extractors
// =========================================================================

/// Pool identifiers in canonical order.
pub fn pool_names(pool: &ImagePool) -> Vec<&str> {
    pool.iter().collect()
}

/// Published-asset files present in `dir`, sorted.
pub fn asset_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| parse_asset_filename(n).is_some())
        .collect();
    names.sort();
    names
}
