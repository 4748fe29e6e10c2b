//! Filesystem utilities for atomic blob writes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Write `data` to `path` so that readers see either nothing or the full contents.
///
/// Data goes to a sibling `.tmp` file that is synced before being renamed
/// into place. The destination must not already exist; blobs are never
/// overwritten.
///
/// # Errors
///
/// Returns an error if the destination exists or any step fails. The temp
/// file is removed on failure.
pub fn write_new_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid blob filename"))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_new_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("blob.tccap");

        write_new_atomic(&dest, b"ciphertext").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"ciphertext");
        assert!(!dir.path().join(".blob.tccap.tmp").exists());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("blob.tccap");
        fs::write(&dest, b"old").unwrap();

        let err = write_new_atomic(&dest, b"new").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_missing_parent_cleans_up() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing").join("blob.tccap");

        assert!(write_new_atomic(&dest, b"data").is_err());
        assert!(!dest.exists());
    }
}
