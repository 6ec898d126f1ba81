use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error while loading or parsing a config file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Top-level generator configuration.
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional RNG seed for deterministic output.
    pub seed: Option<u64>,
    /// Output sink configuration.
    pub output: OutputConfig,
    /// Which generators are started.
    pub generators: GeneratorsConfig,
    /// Vocabulary overrides.
    pub categories: CategoriesConfig,
}

impl Config {
    /// Loads a config file from TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Output sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log file that receives every record.
    pub path: String,
    /// Mirror every record to stdout.
    pub console: bool,
    /// Rotate the log file once it would grow past this size.
    pub target_size_mb: Option<u64>,
    /// Encoding used for `duration` fields.
    pub duration_format: DurationFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./logs/demo_log.log".to_string(),
            console: true,
            target_size_mb: None,
            duration_format: DurationFormat::Seconds,
        }
    }
}

/// Encoding for duration-valued fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    /// Floating-point seconds.
    #[default]
    Seconds,
    /// Integer nanoseconds.
    Nanos,
    /// Human-readable string such as `12.5ms`.
    String,
}

/// Enables or disables individual generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorsConfig {
    pub login_failure: bool,
    pub login_success: bool,
    pub service_failure: bool,
    pub service_call: bool,
}

impl Default for GeneratorsConfig {
    fn default() -> Self {
        Self {
            login_failure: true,
            login_success: true,
            service_failure: true,
            service_call: true,
        }
    }
}

/// Optional replacements for the built-in vocabularies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub users: Option<Vec<String>>,
    pub paths: Option<Vec<String>>,
    pub status_codes: Option<Vec<u16>>,
    pub errors: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").expect("config");
        assert!(config.seed.is_none());
        assert_eq!(config.output.path, "./logs/demo_log.log");
        assert!(config.output.console);
        assert_eq!(config.output.duration_format, DurationFormat::Seconds);
        assert!(config.generators.login_failure);
        assert!(config.generators.service_call);
        assert!(config.categories.users.is_none());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = Config::from_toml(
            r#"
            seed = 42

            [output]
            path = "/tmp/out.log"
            duration_format = "nanos"

            [generators]
            service_call = false

            [categories]
            users = ["carol", "dave"]
            "#,
        )
        .expect("config");

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.output.path, "/tmp/out.log");
        assert!(config.output.console);
        assert_eq!(config.output.duration_format, DurationFormat::Nanos);
        assert!(!config.generators.service_call);
        assert!(config.generators.login_success);
        assert_eq!(
            config.categories.users,
            Some(vec!["carol".to_string(), "dave".to_string()])
        );
    }

    #[test]
    fn bundled_config_parses() {
        let config = Config::from_toml(include_str!("../../configs/default.toml")).expect("config");
        assert_eq!(config.output.path, "./logs/demo_log.log");
        assert_eq!(config.categories.status_codes, Some(vec![200, 404, 500]));
        assert_eq!(config.categories.services.map(|services| services.len()), Some(4));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("seed = \"nope\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
