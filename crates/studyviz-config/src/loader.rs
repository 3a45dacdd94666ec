//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::{Path, PathBuf};
use studyviz_common::Result as StudyVizResult;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "STUDYVIZ_CONFIG_PATH";

/// Files looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["studyviz.yaml", "studyviz.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for studyviz_common::StudyVizError {
    fn from(err: ConfigError) -> Self {
        studyviz_common::StudyVizError::config_with_source(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        debug!(path = %path.as_ref().display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse and validate YAML text without consulting the environment
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Locate the configuration file: explicit path, then the environment,
    /// then the default file names in the working directory
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Load configuration from the located file, or defaults with env overrides
    pub fn load(explicit: Option<&Path>) -> StudyVizResult<Config> {
        let config = match Self::locate(explicit) {
            Some(path) => Self::load_config(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate_all().map_err(ConfigError::ValidationError)?;
                config
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StudyVizResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("STUDYVIZ_INPUT_PATH") {
            config.input.path = path;
        }

        if let Ok(sheet) = env::var("STUDYVIZ_INPUT_SHEET") {
            config.input.sheet = Some(sheet).filter(|s| !s.trim().is_empty());
        }

        if let Ok(dir) = env::var("STUDYVIZ_OUTPUT_DIR") {
            config.output.directory = dir;
        }

        if let Ok(dpi) = env::var("STUDYVIZ_DPI") {
            config.style.dpi = dpi.parse().map_err(|e| ConfigError::EnvParseError {
                var: "STUDYVIZ_DPI".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("LOG_FILE") {
            config.logging.file = Some(file);
        }

        if let Ok(colored) = env::var("LOG_COLORED") {
            config.logging.colored = colored.parse().map_err(|e| ConfigError::EnvParseError {
                var: "LOG_COLORED".to_string(),
                source: Box::new(e),
            })?;
        }

        Ok(())
    }
}
