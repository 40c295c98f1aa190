//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use daily_image::naming::parse_asset_filename;
use std::path::Path;
use tempfile::TempDir;

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Bytes written for a fixture image, unique per name.
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
