use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use capsule_core::crypto::DEFAULT_ITERATIONS;

/// Default seconds between auto-unlock checks.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CapsuleConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub crypto: CryptoSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
        }
    }
}

/// Key derivation settings; changing them makes existing capsules unopenable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoSection {
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_ITERATIONS,
        }
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECONDS
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

impl CapsuleConfig {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            store: StoreSection {
                data_dir: Some(data_dir.to_string_lossy().to_string()),
            },
            scheduler: SchedulerSection::default(),
            crypto: CryptoSection::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scheduler.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!(
                "scheduler.poll_interval_seconds must be at least 1"
            ));
        }
        if self.crypto.kdf_iterations == 0 {
            return Err(anyhow::anyhow!("crypto.kdf_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Config path: `TIMECAPSULE_CONFIG` if set, else the XDG location.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("TIMECAPSULE_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

/// Read the config file, or defaults when it does not exist yet.
pub fn load_config(path: &Path) -> anyhow::Result<CapsuleConfig> {
    if !path.exists() {
        return Ok(CapsuleConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<CapsuleConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: CapsuleConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &CapsuleConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("timecapsule"));
        }
    }
    Ok(home_dir()?.join(".config").join("timecapsule"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("timecapsule"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("timecapsule"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: CapsuleConfig = toml::from_str("").unwrap();
        assert_eq!(config, CapsuleConfig::default());
        assert_eq!(config.scheduler.poll_interval_seconds, 60);
        assert_eq!(config.crypto.kdf_iterations, 390_000);
    }

    #[test]
    fn test_partial_scheduler_section() {
        let config: CapsuleConfig =
            toml::from_str("[scheduler]\npoll_interval_seconds = 5\n").unwrap();
        assert_eq!(config.scheduler.poll_interval_seconds, 5);
        assert_eq!(config.crypto.kdf_iterations, DEFAULT_ITERATIONS);
        assert!(config.store.data_dir.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = CapsuleConfig::new(Path::new("/srv/capsules"));

        write_config(&path, &config).unwrap();

        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\npoll_interval_seconds = 0\n").unwrap();

        assert!(read_config(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CapsuleConfig::default());
    }
}
