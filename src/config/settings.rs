use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lookup key for the repository root
pub const REPO_ROOT_KEY: &str = "REPO_ROOT";

/// Prefix applied to keys by [`EnvLookup`]
pub const ENV_PREFIX: &str = "GITBRIDGE_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Config value not set: {0}")]
    MissingKey(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Named-value lookup used to resolve settings at call time
///
/// The runner asks for [`REPO_ROOT_KEY`] when an operation does not pass an
/// explicit working directory.
pub trait SettingsLookup: Send + Sync {
    fn get(&self, name: &str) -> Result<String, ConfigError>;

    /// Path-valued setting; paths need not be valid UTF-8
    fn get_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        self.get(name).map(PathBuf::from)
    }
}

/// Reads settings from `GITBRIDGE_<NAME>` environment variables
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvLookup;

impl SettingsLookup for EnvLookup {
    fn get(&self, name: &str) -> Result<String, ConfigError> {
        let var = format!("{}{}", ENV_PREFIX, name);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingKey(var)),
        }
    }

    fn get_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let var = format!("{}{}", ENV_PREFIX, name);
        match std::env::var_os(&var) {
            Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => Err(ConfigError::MissingKey(var)),
        }
    }
}

/// Pins the repository root to a known path
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl SettingsLookup for FixedRoot {
    fn get(&self, name: &str) -> Result<String, ConfigError> {
        match name {
            REPO_ROOT_KEY => Ok(self.0.display().to_string()),
            other => Err(ConfigError::MissingKey(other.to_string())),
        }
    }

    fn get_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        match name {
            REPO_ROOT_KEY => Ok(self.0.clone()),
            other => Err(ConfigError::MissingKey(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub git: GitConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitConfig {
    pub program: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<PathBuf>,
    pub max_concurrent_processes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuditConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitbridge"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to an explicit file, creating parent directories
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            git: GitConfig {
                program: "git".to_string(),
                repo_root: None,
                max_concurrent_processes: 8,
                timeout_seconds: None,
            },
            audit: AuditConfig {
                enabled: false,
                log_path: None,
            },
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.git.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.program must not be empty".to_string(),
            ));
        }

        if self.git.max_concurrent_processes == 0 {
            return Err(ConfigError::InvalidValue(
                "max_concurrent_processes must be greater than 0".to_string(),
            ));
        }

        if self.git.timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl SettingsLookup for Config {
    fn get(&self, name: &str) -> Result<String, ConfigError> {
        match name {
            REPO_ROOT_KEY => self
                .git
                .repo_root
                .as_ref()
                .map(|p| p.display().to_string())
                .ok_or_else(|| ConfigError::MissingKey("git.repo_root".to_string())),
            other => Err(ConfigError::MissingKey(other.to_string())),
        }
    }

    fn get_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        match name {
            REPO_ROOT_KEY => self
                .git
                .repo_root
                .clone()
                .ok_or_else(|| ConfigError::MissingKey("git.repo_root".to_string())),
            other => Err(ConfigError::MissingKey(other.to_string())),
        }
    }
}
