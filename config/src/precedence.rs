//! # Configuration Precedence
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority, applied by the binary)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)

use crate::config::TenancyConfig;
use crate::error::ConfigError;
use crate::file_loader::load_from_file;
use crate::loader::apply_env;
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Load and validate configuration from an optional file and the
/// environment.
pub fn load(path: Option<&Path>) -> Result<TenancyConfig, ConfigError> {
    let base = match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            load_from_file(path)?
        }
        None => TenancyConfig::default(),
    };

    let config = apply_env(base)?;
    config.validate()?;

    debug!(
        "Configuration loaded: base_domain={} max_attempts={} store={}",
        config.domains.base_domain,
        config.resolver.max_attempts,
        config.store.url.as_deref().unwrap_or("in-memory"),
    );

    Ok(config)
}
