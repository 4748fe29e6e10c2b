//! Resolved runtime settings shared by command handlers.

use std::path::PathBuf;
use std::time::Duration;

use capsule_core::{SqliteCapsuleStore, StoreConfig};

use crate::cli::Cli;
use crate::config::{default_data_dir, load_config, resolve_config_path, CapsuleConfig};
use crate::errors::CliError;

pub struct App {
    pub config_path: PathBuf,
    pub config: CapsuleConfig,
    pub data_dir: PathBuf,
}

impl App {
    /// Resolve config and data directory.
    ///
    /// The data directory comes from `--data-dir`/`TIMECAPSULE_DATA_DIR`,
    /// then the config file, then the XDG data directory.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = resolve_config_path()?;
        let config = load_config(&config_path)?;

        let data_dir = match (&cli.data_dir, &config.store.data_dir) {
            (Some(flag), _) => flag.clone(),
            (None, Some(configured)) if !configured.trim().is_empty() => {
                PathBuf::from(configured)
            }
            _ => default_data_dir()?,
        };

        Ok(Self {
            config_path,
            config,
            data_dir,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::under(&self.data_dir)
    }

    pub fn kdf_iterations(&self) -> u32 {
        self.config.crypto.kdf_iterations
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.scheduler.poll_interval_seconds)
    }

    /// Open an existing store; fails if `init` has not been run.
    pub fn open_store(&self) -> anyhow::Result<SqliteCapsuleStore> {
        let store_config = self.store_config();
        if !store_config.catalog_path.exists() {
            return Err(CliError::not_found(
                format!("No capsule store found in {}", self.data_dir.display()),
                "Hint: Run `timecapsule init` first or pass --data-dir.",
            )
            .into());
        }
        Ok(SqliteCapsuleStore::open(store_config)?)
    }
}
