//! Store location configuration.

use std::path::{Path, PathBuf};

/// File name of the SQLite catalog inside a data directory.
pub const CATALOG_FILE: &str = "capsules.db";

/// Directory holding ciphertext blobs inside a data directory.
pub const BLOB_DIR: &str = "capsule_files";

/// Where a capsule store keeps its catalog and blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub catalog_path: PathBuf,
    pub blob_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(catalog_path: impl Into<PathBuf>, blob_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            blob_dir: blob_dir.into(),
        }
    }

    /// Standard layout under a single data directory.
    pub fn under(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CATALOG_FILE), data_dir.join(BLOB_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_data_dir() {
        let config = StoreConfig::under(Path::new("/data/tc"));
        assert_eq!(config.catalog_path, PathBuf::from("/data/tc/capsules.db"));
        assert_eq!(config.blob_dir, PathBuf::from("/data/tc/capsule_files"));
    }
}
