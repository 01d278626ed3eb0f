//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::notebook::NotebookOptions;

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Default notebook database
    pub db: Option<PathBuf>,

    /// Protected session inactivity timeout, overriding the stored one
    pub session_timeout_secs: Option<u64>,

    /// How often the session expiry timer runs
    pub expiry_check_secs: Option<u64>,

    /// How long the fulltext worker sleeps between checks
    pub fulltext_interval_ms: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/grove/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grove")
            .join("config.toml")
    }

    /// Resolve the database path, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--db` argument
    /// 2. Config file `db` setting
    /// 3. `grove/notebook.db` in the user data directory
    pub fn db_path(&self, cli_db: Option<&PathBuf>) -> PathBuf {
        cli_db
            .cloned()
            .or_else(|| self.db.clone())
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("grove")
                    .join("notebook.db")
            })
    }

    /// Notebook settings, starting from the library defaults.
    pub fn notebook_options(&self) -> NotebookOptions {
        let mut options = NotebookOptions::default();
        if let Some(secs) = self.session_timeout_secs {
            options.session_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = self.expiry_check_secs {
            options.expiry_check_interval = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = self.fulltext_interval_ms {
            options.fulltext_interval = Some(Duration::from_millis(ms));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_no_db() {
        let config = Config::default();
        assert!(config.db.is_none());
    }

    #[test]
    fn db_path_prefers_cli_arg() {
        let config = Config {
            db: Some(PathBuf::from("/config/notes.db")),
            ..Config::default()
        };
        let cli_db = PathBuf::from("/cli/notes.db");
        assert_eq!(config.db_path(Some(&cli_db)), PathBuf::from("/cli/notes.db"));
    }

    #[test]
    fn db_path_falls_back_to_config() {
        let config = Config {
            db: Some(PathBuf::from("/config/notes.db")),
            ..Config::default()
        };
        assert_eq!(config.db_path(None), PathBuf::from("/config/notes.db"));
    }

    #[test]
    fn db_path_defaults_to_data_dir() {
        let config = Config::default();
        assert!(config.db_path(None).ends_with("grove/notebook.db"));
    }

    #[test]
    fn config_path_is_in_config_dir() {
        let path = Config::config_path();
        assert!(path.ends_with("grove/config.toml"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.db.is_none());
        assert!(config.session_timeout_secs.is_none());
    }

    #[test]
    fn loads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "db = \"/data/grove.db\"\nsession_timeout_secs = 60\nexpiry_check_secs = 2\nfulltext_interval_ms = 250\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.db, Some(PathBuf::from("/data/grove.db")));

        let options = config.notebook_options();
        assert_eq!(options.session_timeout, Some(Duration::from_secs(60)));
        assert_eq!(options.expiry_check_interval, Some(Duration::from_secs(2)));
        assert_eq!(options.fulltext_interval, Some(Duration::from_millis(250)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session_timeout_secs = \"soon\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
