//! Scoped temporary files for decrypted media.
//!
//! Viewers for photos and videos usually want a path, so decrypted bytes
//! sometimes have to touch disk. A [`SecureTempFile`] is created owner-only,
//! and on drop its contents are overwritten with zeros, synced and the file
//! is removed. This is best effort: the filesystem or storage medium may
//! still keep copies.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{CapsuleError, Result};

const WIPE_CHUNK: usize = 64 * 1024;

/// A temp file holding sensitive bytes, wiped and deleted on drop.
#[derive(Debug)]
pub struct SecureTempFile {
    file: Option<NamedTempFile>,
    len: u64,
}

impl SecureTempFile {
    /// Write `contents` to a new temp file whose name ends with `suffix`.
    pub fn create(contents: &[u8], suffix: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("timecapsule-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| CapsuleError::Storage(format!("Temp file create failed: {}", e)))?;

        restrict_permissions(file.as_file())?;

        let len = contents.len() as u64;
        if let Err(e) = file.write_all(contents).and_then(|_| file.as_file().sync_all()) {
            // Partially written plaintext; the NamedTempFile drop removes the file.
            let _ = wipe(file.as_file_mut(), len);
            return Err(CapsuleError::Storage(format!(
                "Temp file write failed: {}",
                e
            )));
        }

        Ok(Self {
            file: Some(file),
            len,
        })
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for SecureTempFile {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = wipe(file.as_file_mut(), self.len);
            let _ = file.close();
        }
    }
}

fn wipe(file: &mut File, len: u64) -> io::Result<()> {
    let zeros = [0u8; WIPE_CHUNK];
    file.seek(SeekFrom::Start(0))?;
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(WIPE_CHUNK as u64) as usize;
        file.write_all(&zeros[..chunk])?;
        remaining -= chunk as u64;
    }
    file.flush()?;
    file.sync_all()
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .map_err(|e| CapsuleError::Storage(format!("Temp file chmod failed: {}", e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_readable_while_alive() {
        let temp = SecureTempFile::create(b"decrypted photo", ".jpg").unwrap();

        assert_eq!(std::fs::read(temp.path()).unwrap(), b"decrypted photo");
        assert!(temp.path().to_string_lossy().ends_with(".jpg"));
    }

    #[test]
    fn test_removed_on_drop() {
        let temp = SecureTempFile::create(b"decrypted video", ".mp4").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.exists());

        drop(temp);

        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = SecureTempFile::create(b"secret", "").unwrap();
        let mode = std::fs::metadata(temp.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_wipe_zeroes_contents() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"sensitive bytes").unwrap();

        wipe(&mut file, 15).unwrap();

        use std::io::Read;
        let mut buf = Vec::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![0u8; 15]);
    }
}
