//! Application configuration management.
//!
//! The configuration file is JSON, stored at the platform config directory
//! (`config.json`). Today it only carries the default index location.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

/// File name of the index used when nothing else is configured.
pub const DEFAULT_INDEX_NAME: &str = "DupFinder.db";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Index location used when `--use-db` and `DUPFINDER_DB` are absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let loaded = Self::config_path().and_then(|path| {
            if path.exists() {
                Self::load_from(&path)
            } else {
                Ok(Self::default())
            }
        });
        match loaded {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Save the configuration to an explicit path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Fails when no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupfinder", "dupfinder")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Pick the index location: an explicit path (from `--use-db` or
    /// `DUPFINDER_DB`) wins, then `index_path`, then `~/DupFinder.db`.
    #[must_use]
    pub fn resolve_index_path(&self, explicit: Option<&Path>) -> PathBuf {
        let chosen = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.index_path.clone())
            .unwrap_or_else(default_index_path);
        expand_tilde(&chosen)
    }
}

/// `~/DupFinder.db`, or `DupFinder.db` in the working directory when there
/// is no home directory.
#[must_use]
pub fn default_index_path() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(DEFAULT_INDEX_NAME),
        None => PathBuf::from(DEFAULT_INDEX_NAME),
    }
}

/// Replace a leading `~` component with the home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_has_no_index_path() {
        assert_eq!(Config::default().index_path, None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            index_path: Some(PathBuf::from("/data/index.db")),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_from_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config"));
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let config = Config {
            index_path: Some(PathBuf::from("/from/config.db")),
        };
        let resolved = config.resolve_index_path(Some(Path::new("/explicit.db")));
        assert_eq!(resolved, PathBuf::from("/explicit.db"));
    }

    #[test]
    fn test_resolve_falls_back_to_config() {
        let config = Config {
            index_path: Some(PathBuf::from("/from/config.db")),
        };
        assert_eq!(
            config.resolve_index_path(None),
            PathBuf::from("/from/config.db")
        );
    }

    #[test]
    fn test_resolve_default_name() {
        let resolved = Config::default().resolve_index_path(None);
        assert!(resolved.ends_with(DEFAULT_INDEX_NAME));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/indexes/a.db"));
        if BaseDirs::new().is_some() {
            assert!(!expanded.starts_with("~"));
            assert!(expanded.ends_with("indexes/a.db"));
        }
        assert_eq!(
            expand_tilde(Path::new("/abs/a.db")),
            PathBuf::from("/abs/a.db")
        );
        assert_eq!(
            expand_tilde(Path::new("~user/a.db")),
            PathBuf::from("~user/a.db")
        );
    }
}
