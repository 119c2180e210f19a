use thiserror::Error;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse TOML: {reason}")]
    TomlParse { reason: String },

    #[error("Failed to parse YAML: {reason}")]
    YamlParse { reason: String },

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid value for {variable}: {value}")]
    InvalidEnvValue { variable: String, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
