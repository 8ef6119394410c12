use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable holding the OpenWeatherMap API key. Takes
/// precedence over the config file.
pub const API_KEY_ENV: &str = "WEATHER_APIKEY";

/// Default relative path of the search history database.
pub const DEFAULT_DB_PATH: &str = "db/search_results.db";

fn default_lang() -> String {
    "en".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,

    /// Response language passed to the provider.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Path of the SQLite database file, relative to the working directory.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: default_lang(),
            db_path: default_db_path(),
        }
    }
}

impl Config {
    /// Load config from disk (or an empty default if it doesn't exist yet),
    /// then apply the environment override for the API key.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_file()?;
        Ok(cfg.with_env_override(env::var(API_KEY_ENV).ok()))
    }

    /// A non-blank environment API key wins over the config file.
    fn with_env_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }

        self
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "quickweather", "quickweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace the stored API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, or an error with a remediation hint.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: set the {API_KEY_ENV} environment variable (a .env file works) \
                     or run `quickweather configure`."
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };

        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn set_api_key_makes_the_key_available() {
        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());

        assert_eq!(cfg.require_api_key().expect("key must exist"), "OPEN_KEY");
    }

    #[test]
    fn defaults_cover_lang_and_db_path() {
        let cfg = Config::default();

        assert_eq!(cfg.lang, "en");
        assert_eq!(cfg.db_path, PathBuf::from("db/search_results.db"));
    }

    #[test]
    fn environment_key_wins_over_file_key() {
        let cfg = Config {
            api_key: Some("FILE_KEY".to_string()),
            ..Config::default()
        };

        let cfg = cfg.with_env_override(Some("ENV_KEY".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_environment_key_keeps_file_key() {
        let cfg = Config {
            api_key: Some("FILE_KEY".to_string()),
            ..Config::default()
        };

        let cfg = cfg.with_env_override(Some("  ".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("FILE_KEY"));

        let cfg = cfg.with_env_override(None);
        assert_eq!(cfg.api_key.as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn sparse_config_file_parses_with_defaults() {
        let cfg: Config = toml::from_str("api_key = \"OPEN_KEY\"").expect("parse");

        assert_eq!(cfg.api_key.as_deref(), Some("OPEN_KEY"));
        assert_eq!(cfg.lang, "en");
        assert_eq!(cfg.db_path, PathBuf::from("db/search_results.db"));
    }
}
