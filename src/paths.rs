//! Filesystem predicates and unique naming for persisted graphs.
//!
//! The memory-mapped engine uses these to decide between creating a fresh
//! set of region files and reopening an existing one, and to invent a
//! basename when the caller does not supply one.

use std::path::{Path, PathBuf};

use uuid::Uuid;

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

/// Auto-generated basename for a persisted graph's region files, unique
/// per call: `<dir>/graph-<uuid>`.
pub fn unique_basename(dir: &Path) -> PathBuf {
    dir.join(format!("graph-{}", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_distinguish_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.bin");
        std::fs::write(&file, b"x").unwrap();

        assert!(path_exists(dir.path()));
        assert!(is_directory(dir.path()));
        assert!(!is_file(dir.path()));
        assert!(path_exists(&file));
        assert!(is_file(&file));
        assert!(!is_directory(&file));
        assert!(!path_exists(&dir.path().join("missing")));
    }

    #[test]
    fn unique_basenames_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = unique_basename(dir.path());
        let b = unique_basename(dir.path());
        assert_ne!(a, b);
        assert!(a.starts_with(dir.path()));
    }
}
