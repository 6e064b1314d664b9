use kalorie_core::{MacroSplit, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Macro split as written in the config file: a name or explicit fractions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SplitSetting {
    Named(String),
    Custom { protein: f64, carbs: f64, fat: f64 },
}

impl SplitSetting {
    fn resolve(self) -> Result<MacroSplit, String> {
        match self {
            SplitSetting::Named(name) => match name.to_lowercase().as_str() {
                "default" => Ok(MacroSplit::DEFAULT),
                "alternative" => Ok(MacroSplit::ALTERNATIVE),
                _ => Err(format!(
                    "unknown macro split '{}' (expected 'default' or 'alternative')",
                    name
                )),
            },
            SplitSetting::Custom {
                protein,
                carbs,
                fat,
            } => MacroSplit::new(protein, carbs, fat).map_err(|e| e.to_string()),
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the Kalorie backend API
    pub api_url: ConfigValue<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// Split used when calories are set without any macro baseline
    pub default_split: ConfigValue<MacroSplit>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    default_split: Option<SplitSetting>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut api_url = ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default);
        let mut request_timeout_secs =
            ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut default_split = ConfigValue::new(MacroSplit::DEFAULT, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
            if let Some(split) = file_config.default_split {
                let split = split
                    .resolve()
                    .map_err(|e| ConfigError::InvalidValue("default_split".to_string(), e))?;
                default_split = ConfigValue::new(split, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("KALORIE_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(secs) = std::env::var("KALORIE_REQUEST_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("KALORIE_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            request_timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            api_url,
            request_timeout_secs,
            default_split,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/kalorie/
    /// - macOS: ~/Library/Application Support/kalorie/
    /// - Windows: %APPDATA%/kalorie/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kalorie")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, e) => {
                write!(f, "Invalid value for '{}': {}", key, e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
