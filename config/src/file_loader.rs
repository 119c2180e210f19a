//! # Configuration File Loading
//!
//! Loads configuration from TOML or YAML files.
//!
//! Supports automatic format detection based on file extension.

use crate::config::TenancyConfig;
use crate::error::ConfigError;
use std::path::Path;

/// Load configuration from a TOML file.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_toml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_toml(Path::new("churchos.toml"))?;
///     println!("Base domain: {}", config.domains.base_domain);
///     Ok(())
/// }
/// ```
pub fn load_from_toml(path: &Path) -> Result<TenancyConfig, ConfigError> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse {
        reason: e.to_string(),
    })
}

/// Load configuration from a YAML file.
pub fn load_from_yaml(path: &Path) -> Result<TenancyConfig, ConfigError> {
    let contents = read(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::YamlParse {
        reason: e.to_string(),
    })
}

/// Load configuration from file, detecting the format from its extension.
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml` / `.yml`: YAML format
pub fn load_from_file(path: &Path) -> Result<TenancyConfig, ConfigError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_e| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })
}
