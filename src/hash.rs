//! BLAKE3 content fingerprints for fetched catalogs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{self, Result};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

const GIT_DIR: &str = ".git";

fn hash_file_into(hasher: &mut Hasher, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| {
        error::fs::io_error(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            error::fs::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Fingerprint a catalog tree
///
/// Hashes every file under `root` recursively, sorted by path for
/// deterministic results. The `.git` directory is excluded so that the
/// fingerprint only changes when catalog content changes.
pub fn fingerprint(root: &Path) -> Result<String> {
    if !root.is_dir() {
        return Err(error::fs::io_error(format!(
            "Catalog directory not found: {}",
            root.display()
        )));
    }

    let mut hasher = Hasher::new();
    let mut files: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != GIT_DIR)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    // Sort for deterministic hashing
    files.sort_by_key(|e| e.path().to_path_buf());

    for entry in files {
        let file_path = entry.path();

        // Include relative path in hash for uniqueness
        let relative_path = file_path
            .strip_prefix(root)
            .unwrap_or(file_path)
            .to_string_lossy();
        hasher.update(relative_path.as_bytes());
        hasher.update(b"\0");

        hash_file_into(&mut hasher, file_path)?;

        hasher.update(b"\0");
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("file1.txt"), "content1").unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();
        std::fs::write(temp.path().join("subdir/file2.txt"), "content2").unwrap();

        let hash = fingerprint(temp.path()).unwrap();
        assert!(hash.starts_with(HASH_PREFIX));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        std::fs::write(temp.path().join("b.txt"), "bbb").unwrap();

        assert_eq!(fingerprint(temp.path()).unwrap(), fingerprint(temp.path()).unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        let before = fingerprint(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.txt"), "changed").unwrap();
        assert_ne!(before, fingerprint(temp.path()).unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_rename() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        let before = fingerprint(temp.path()).unwrap();

        std::fs::rename(temp.path().join("a.txt"), temp.path().join("b.txt")).unwrap();
        assert_ne!(before, fingerprint(temp.path()).unwrap());
    }

    #[test]
    fn test_fingerprint_ignores_git_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        let before = fingerprint(temp.path()).unwrap();

        std::fs::create_dir(temp.path().join(".git")).unwrap();
        std::fs::write(temp.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        assert_eq!(before, fingerprint(temp.path()).unwrap());
    }

    #[test]
    fn test_fingerprint_missing_dir() {
        assert!(fingerprint(Path::new("/nonexistent/catalog")).is_err());
    }
}
