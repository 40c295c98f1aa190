//! Image pool discovery.
//!
//! Walks the source directory and collects every file whose name ends in
//! `.jpg` or `.jpeg`. The suffix match is exact: `photo.JPG` is ignored.
//! Nothing else about the files is inspected; the bytes are only read when
//! the chosen image is published.
//!
//! ## Identifiers
//!
//! Each image is identified by its path relative to the source directory,
//! with `/` as separator:
//!
//! ```text
//! images/
//! ├── dawn.jpg            → "dawn.jpg"
//! ├── notes.txt           (ignored)
//! └── travel/
//!     └── kyoto.jpeg      → "travel/kyoto.jpeg"
//! ```
//!
//! The identifier is also what gets hashed by the [`mapper`](crate::mapper),
//! so renaming or moving a file changes which days it is picked on.
//!
//! ## Ordering
//!
//! [`ImagePool`] sorts its identifiers byte-wise on construction. The
//! selection depends only on the sorted pool, never on the order the
//! filesystem happens to return entries in.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to scan image directory {path}: {source}")]
    DirectoryScan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Recognized image suffixes, matched literally against the file name.
const POOL_EXTENSIONS: &[&str] = &[".jpg", ".jpeg"];

/// Canonically ordered set of candidate image identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePool {
    images: Vec<String>,
}

impl ImagePool {
    /// Build a pool from identifiers in any order. Duplicates are collapsed.
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut images: Vec<String> = images.into_iter().map(Into::into).collect();
        images.sort();
        images.dedup();
        Self { images }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Identifiers in canonical (byte-wise sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    pub fn contains(&self, image: &str) -> bool {
        self.images.binary_search_by(|i| i.as_str().cmp(image)).is_ok()
    }
}

/// Returns true if `file_name` carries one of the pool suffixes.
pub fn is_pool_image(file_name: &str) -> bool {
    POOL_EXTENSIONS
        .iter()
        .any(|ext| file_name.len() > ext.len() && file_name.ends_with(ext))
}

/// Scan `root` recursively and build the image pool.
///
/// Any error while walking (missing root, unreadable subdirectory) fails
/// the whole scan rather than returning a partial pool. Symlinked
/// directories are not descended into; a symlink with an image suffix is
/// taken as an image.
pub fn scan_pool(root: &Path) -> Result<ImagePool, ScanError> {
    let mut images = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|source| ScanError::DirectoryScan {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !is_pool_image(&name) {
            continue;
        }
        // Always under root: WalkDir yields paths joined onto it
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        images.push(pool_identifier(rel));
    }

    Ok(ImagePool::new(images))
}

/// Render a relative path as a `/`-separated identifier.
fn pool_identifier(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a pool identifier back to a path under `root`.
pub fn source_path(root: &Path, image: &str) -> PathBuf {
    image.split('/').fold(root.to_path_buf(), |p, part| p.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;

    #[test]
    fn pool_sorts_bytewise() {
        let pool = ImagePool::new(["b.jpg", "B.jpg", "a.jpg", "a.jpeg"]);
        let order: Vec<&str> = pool.iter().collect();
        assert_eq!(order, vec!["B.jpg", "a.jpeg", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn pool_collapses_duplicates() {
        let pool = ImagePool::new(["a.jpg", "a.jpg"]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn pool_contains() {
        let pool = ImagePool::new(["c.jpg", "a.jpg"]);
        assert!(pool.contains("a.jpg"));
        assert!(!pool.contains("b.jpg"));
    }

    #[test]
    fn suffix_match_is_exact() {
        assert!(is_pool_image("dawn.jpg"));
        assert!(is_pool_image("dawn.jpeg"));
        assert!(!is_pool_image("dawn.JPG"));
        assert!(!is_pool_image("dawn.Jpeg"));
        assert!(!is_pool_image("dawn.png"));
        assert!(!is_pool_image("dawn.jpg.txt"));
    }

    #[test]
    fn bare_suffix_is_not_an_image() {
        assert!(!is_pool_image(".jpg"));
    }

    #[test]
    fn scan_filters_by_extension() {
        let tmp = image_dir(&["b.jpg", "a.jpeg", "notes.txt", "c.png", "d.JPG"]);
        let pool = scan_pool(tmp.path()).unwrap();
        assert_eq!(pool_names(&pool), vec!["a.jpeg", "b.jpg"]);
    }

    #[test]
    fn scan_includes_subdirectories() {
        let tmp = image_dir(&["top.jpg"]);
        fs::create_dir(tmp.path().join("travel")).unwrap();
        fs::write(tmp.path().join("travel/kyoto.jpeg"), b"kyoto").unwrap();

        let pool = scan_pool(tmp.path()).unwrap();
        assert_eq!(pool_names(&pool), vec!["top.jpg", "travel/kyoto.jpeg"]);
    }

    #[test]
    fn scan_skips_directories_named_like_images() {
        let tmp = image_dir(&["real.jpg"]);
        fs::create_dir(tmp.path().join("fake.jpg")).unwrap();

        let pool = scan_pool(tmp.path()).unwrap();
        assert_eq!(pool_names(&pool), vec!["real.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn scan_does_not_follow_directory_symlinks() {
        let tmp = image_dir(&["a.jpg"]);
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("loop")).unwrap();

        let pool = scan_pool(tmp.path()).unwrap();
        assert_eq!(pool_names(&pool), vec!["a.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn scan_includes_symlinked_images() {
        let tmp = image_dir(&["a.jpg"]);
        std::os::unix::fs::symlink(tmp.path().join("a.jpg"), tmp.path().join("b.jpg")).unwrap();

        let pool = scan_pool(tmp.path()).unwrap();
        assert_eq!(pool_names(&pool), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn scan_empty_directory_gives_empty_pool() {
        let tmp = image_dir(&[]);
        assert!(scan_pool(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn scan_missing_directory_fails() {
        let tmp = image_dir(&[]);
        let missing = tmp.path().join("nope");
        assert!(matches!(
            scan_pool(&missing),
            Err(ScanError::DirectoryScan { .. })
        ));
    }

    #[test]
    fn source_path_resolves_nested_identifier() {
        let root = Path::new("/srv/images");
        assert_eq!(
            source_path(root, "travel/kyoto.jpeg"),
            Path::new("/srv/images/travel/kyoto.jpeg")
        );
        assert_eq!(source_path(root, "a.jpg"), Path::new("/srv/images/a.jpg"));
    }
}
