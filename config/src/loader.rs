//! # Environment Variable Loader
//!
//! Overlays configuration with `CHURCHOS_*` environment variables.
//!
//! ## Environment Variables
//! ### Domains
//! - `CHURCHOS_BASE_DOMAIN`: Production base domain
//! - `CHURCHOS_MAIN_DOMAINS`: Comma-separated platform hostnames
//! - `CHURCHOS_LOCAL_HOSTS`: Comma-separated local development hosts
//! - `CHURCHOS_PREVIEW_SUFFIXES`: Comma-separated preview domain suffixes
//! - `CHURCHOS_LEGACY_SEGMENT`: Middle label of the legacy nested pattern
//! - `CHURCHOS_DEVELOPMENT`: Development fallback (true/false)
//!
//! ### Resolver
//! - `CHURCHOS_RESOLVER_MAX_ATTEMPTS`: Lookup attempts per resolution
//! - `CHURCHOS_RESOLVER_BACKOFF_MS`: Base delay between attempts
//!
//! ### Store
//! - `CHURCHOS_STORE_URL`, `CHURCHOS_STORE_API_KEY`, `CHURCHOS_STORE_TABLE`,
//!   `CHURCHOS_STORE_TIMEOUT_SECONDS`
//!
//! ### Server and observability
//! - `CHURCHOS_BIND_ADDRESS`, `CHURCHOS_PORT`, `CHURCHOS_LOG_LEVEL`,
//!   `CHURCHOS_METRICS_ENABLED`

use crate::config::TenancyConfig;
use crate::error::ConfigError;
use std::env;
use std::str::FromStr;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CHURCHOS_";

/// Load configuration from defaults overlaid with the process environment.
pub fn load_from_env() -> Result<TenancyConfig, ConfigError> {
    apply_env(TenancyConfig::default())
}

/// Overlay `config` with the process environment.
pub fn apply_env(config: TenancyConfig) -> Result<TenancyConfig, ConfigError> {
    apply_env_from(config, |name| env::var(name).ok())
}

/// Overlay `config` with variables produced by `lookup`.
///
/// Unset variables leave the corresponding field untouched; set but
/// unparseable variables are an error.
pub fn apply_env_from<F>(mut config: TenancyConfig, lookup: F) -> Result<TenancyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>
{
    let vars = EnvVars { lookup };

    if let Some(value) = vars.string("BASE_DOMAIN") {
        config.domains.base_domain = value;
    }
    if let Some(value) = vars.list("MAIN_DOMAINS") {
        config.domains.main_domains = value;
    }
    if let Some(value) = vars.list("LOCAL_HOSTS") {
        config.domains.local_hosts = value;
    }
    if let Some(value) = vars.list("PREVIEW_SUFFIXES") {
        config.domains.preview_suffixes = value;
    }
    if let Some(value) = vars.string("LEGACY_SEGMENT") {
        config.domains.legacy_segment = value;
    }
    if let Some(value) = vars.parse("DEVELOPMENT")? {
        config.domains.development = value;
    }

    if let Some(value) = vars.parse("RESOLVER_MAX_ATTEMPTS")? {
        config.resolver.max_attempts = value;
    }
    if let Some(value) = vars.parse("RESOLVER_BACKOFF_MS")? {
        config.resolver.backoff_ms = value;
    }

    if let Some(value) = vars.string("STORE_URL") {
        config.store.url = Some(value);
    }
    if let Some(value) = vars.string("STORE_API_KEY") {
        config.store.api_key = Some(value);
    }
    if let Some(value) = vars.string("STORE_TABLE") {
        config.store.table = value;
    }
    if let Some(value) = vars.parse("STORE_TIMEOUT_SECONDS")? {
        config.store.timeout_seconds = value;
    }

    if let Some(value) = vars.string("BIND_ADDRESS") {
        config.server.bind_address = value;
    }
    if let Some(value) = vars.parse("PORT")? {
        config.server.port = value;
    }
    if let Some(value) = vars.string("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some(value) = vars.parse("METRICS_ENABLED")? {
        config.observability.metrics_enabled = value;
    }

    Ok(config)
}

struct EnvVars<F> {
    lookup: F,
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>
{
    fn string(&self, suffix: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{suffix}"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn list(&self, suffix: &str) -> Option<Vec<String>> {
        self.string(suffix).map(|raw| {
            raw.split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        })
    }

    fn parse<T: FromStr>(&self, suffix: &str) -> Result<Option<T>, ConfigError> {
        match self.string(suffix) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnvValue {
                    variable: format!("{ENV_PREFIX}{suffix}"),
                    value: raw,
                }),
        }
    }
}
