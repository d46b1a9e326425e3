//! Runtime configuration. Values come from built-in defaults, then an optional
//! `catalogue.toml` next to the data, then `CATALOGUE_*` environment variables
//! (a `.env` file in the working directory is honoured too).

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalogue";
/// Name of the optional settings file inside the data directory.
const CONFIG_FILE_NAME: &str = "catalogue.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the store and log file live. Defaults to `~/.library-catalogue`.
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub log_file: String,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "catalogue.sqlite".to_string(),
            log_file: "catalogue.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings_path = default_data_dir()?.join(CONFIG_FILE_NAME);
        let config = Config::builder()
            .add_source(File::from(settings_path).required(false))
            .add_source(Environment::with_prefix("CATALOGUE").try_parsing(true))
            .build()
            .context("failed to read configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// The configured data directory, or the per-user default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.database_file))
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
