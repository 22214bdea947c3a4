//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/viewlater/config.toml)
//! 3. Environment variables (VIEWLATER_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::DEFAULT_LIMIT;
use crate::storage::COLLECTION_KEY;

/// Environment variable prefix
const ENV_PREFIX: &str = "VIEWLATER";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the link collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Links shown before "show all"
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,

    /// Fetch the page title when saving a link without one
    #[serde(default = "default_fetch_titles")]
    pub fetch_titles: bool,

    /// Log file used when VIEWLATER_LOG is set
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            display_limit: default_display_limit(),
            fetch_titles: default_fetch_titles(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (VIEWLATER_DATA_DIR, VIEWLATER_DISPLAY_LIMIT,
    ///    VIEWLATER_FETCH_TITLES)
    /// 2. Config file (~/.config/viewlater/config.toml or VIEWLATER_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // VIEWLATER_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // VIEWLATER_DISPLAY_LIMIT (ignored unless a positive number)
        if let Ok(val) = std::env::var(format!("{}_DISPLAY_LIMIT", ENV_PREFIX)) {
            if let Ok(limit) = val.trim().parse::<usize>() {
                if limit > 0 {
                    self.display_limit = limit;
                }
            }
        }

        // VIEWLATER_FETCH_TITLES
        if let Ok(val) = std::env::var(format!("{}_FETCH_TITLES", ENV_PREFIX)) {
            self.fetch_titles = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with VIEWLATER_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("viewlater")
            .join("config.toml")
    }

    /// Get the path to the link collection file
    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", COLLECTION_KEY))
    }

    /// Get the path logs are written to
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("viewlater")
}

fn default_display_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_fetch_titles() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "VIEWLATER_DATA_DIR",
        "VIEWLATER_DISPLAY_LIMIT",
        "VIEWLATER_FETCH_TITLES",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display_limit, 3);
        assert!(config.fetch_titles);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("viewlater"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.links_path().ends_with("myLinks.json"));
        assert!(config.log_path().ends_with("debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/viewlater.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/viewlater.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VIEWLATER_DATA_DIR", "/tmp/viewlater-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/viewlater-test"));
    }

    #[test]
    fn test_env_override_display_limit() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VIEWLATER_DISPLAY_LIMIT", "10");
        config.apply_env_overrides();
        assert_eq!(config.display_limit, 10);

        // Garbage and zero are ignored
        env::set_var("VIEWLATER_DISPLAY_LIMIT", "lots");
        config.apply_env_overrides();
        assert_eq!(config.display_limit, 10);

        env::set_var("VIEWLATER_DISPLAY_LIMIT", "0");
        config.apply_env_overrides();
        assert_eq!(config.display_limit, 10);
    }

    #[test]
    fn test_env_override_fetch_titles() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VIEWLATER_FETCH_TITLES", "false");
        config.apply_env_overrides();
        assert!(!config.fetch_titles);

        env::set_var("VIEWLATER_FETCH_TITLES", "1");
        config.apply_env_overrides();
        assert!(config.fetch_titles);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/viewlater"),
            display_limit: 5,
            fetch_titles: false,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("display_limit"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.display_limit, 5);
        assert!(!parsed.fetch_titles);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            display_limit = 7
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.display_limit, 7);
        // Unset keys keep their defaults
        assert!(config.fetch_titles);
    }

    #[test]
    fn test_save_and_load_path() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            display_limit: 4,
            fetch_titles: true,
            log_file: Some(temp_dir.path().join("log.txt")),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.display_limit, 4);
        assert_eq!(loaded.log_file, config.log_file);
        // Data directory is created on load
        assert!(loaded.data_dir.exists());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();

        env::set_var("VIEWLATER_DATA_DIR", temp_dir.path().join("data"));
        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();

        // Should return defaults when file doesn't exist
        assert_eq!(config.display_limit, 3);
        assert!(config.fetch_titles);
    }
}
