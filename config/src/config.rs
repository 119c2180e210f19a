//! # Configuration Structures
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization, every field defaulted
//! - Use `validator` for input validation
//! - Are plain data; loading and precedence live in sibling modules

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main configuration structure for tenant resolution.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates everything the classifier, resolver, store adapters and the
/// `churchos` binary need.
///
/// ## Usage
/// ```rust,no_run
/// use config::TenancyConfig;
///
/// let config = TenancyConfig::default();
/// println!("Base domain: {}", config.domains.base_domain);
/// ```
///
/// ## Fields
/// - `domains`: Known domain families used by hostname classification
/// - `resolver`: Retry policy for tenant lookups
/// - `store`: Tenant store connection
/// - `server`: HTTP listener for `churchos serve`
/// - `observability`: Logging and metrics
///
/// ## Validation
/// Nested configurations are validated with their own rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct TenancyConfig {
    #[serde(default)]
    #[validate(nested)]
    pub domains: DomainConfig,

    #[serde(default)]
    #[validate(nested)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    #[validate(nested)]
    pub store: StoreConfig,

    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

/// Domain families recognized by the hostname classifier.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `base_domain`: Production base domain; tenants live at `<label>.<base_domain>`
///   (default: "church-os.com")
/// - `main_domains`: Hostnames serving the platform itself; the `www.`
///   variant of each is implied (default: ["church-os.com"])
/// - `local_hosts`: Local development hosts treated as the main domain
///   (default: ["localhost", "127.0.0.1", "[::1]"]). Bracketed IPv6
///   literals are allowed here.
/// - `preview_suffixes`: Preview hosting domains embedding a tenant id in
///   the first label (default: ["lovableproject.com", "lovable.app"])
/// - `legacy_segment`: Middle label of the legacy nested pattern
///   `<label>.<legacy_segment>.<base_domain>` (default: "churches")
/// - `development`: Enables the first-label fallback for arbitrary hosts
///   (default: false)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct DomainConfig {
    #[serde(default = "default_base_domain")]
    #[validate(custom(function = "validate_domain_name"))]
    pub base_domain: String,

    #[serde(default = "default_main_domains")]
    #[validate(custom(function = "validate_domain_list"))]
    pub main_domains: Vec<String>,

    #[serde(default = "default_local_hosts")]
    #[validate(custom(function = "validate_local_host_list"))]
    pub local_hosts: Vec<String>,

    #[serde(default = "default_preview_suffixes")]
    #[validate(custom(function = "validate_domain_list"))]
    pub preview_suffixes: Vec<String>,

    #[serde(default = "default_legacy_segment")]
    #[validate(length(min = 1, max = 63))]
    pub legacy_segment: String,

    #[serde(default)]
    pub development: bool,
}

fn default_base_domain() -> String {
    "church-os.com".to_string()
}

fn default_main_domains() -> Vec<String> {
    vec![default_base_domain()]
}

fn default_local_hosts() -> Vec<String> {
    vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "[::1]".to_string(),
    ]
}

fn default_preview_suffixes() -> Vec<String> {
    vec!["lovableproject.com".to_string(), "lovable.app".to_string()]
}

fn default_legacy_segment() -> String {
    "churches".to_string()
}

fn validate_domain_name(value: &str) -> Result<(), validator::ValidationError> {
    let well_formed = !value.is_empty()
        && value.len() <= 253
        && !value.starts_with('.')
        && !value.ends_with('.')
        && !value.contains("..")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');

    if well_formed {
        Ok(())
    } else {
        Err(validator::ValidationError::new("Invalid domain name"))
    }
}

fn validate_domain_list(values: &[String]) -> Result<(), validator::ValidationError> {
    values.iter().try_for_each(|v| validate_domain_name(v))
}

fn validate_local_host_list(values: &[String]) -> Result<(), validator::ValidationError> {
    values.iter().try_for_each(|v| {
        let ipv6_literal = v
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|inner| {
                !inner.is_empty() && inner.chars().all(|c| c.is_ascii_hexdigit() || c == ':')
            });
        if ipv6_literal {
            Ok(())
        } else {
            validate_domain_name(v)
        }
    })
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            base_domain: default_base_domain(),
            main_domains: default_main_domains(),
            local_hosts: default_local_hosts(),
            preview_suffixes: default_preview_suffixes(),
            legacy_segment: default_legacy_segment(),
            development: false,
        }
    }
}

/// Retry policy for tenant lookups.
///
/// Delay before retry `n` is `n * backoff_ms`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ResolverConfig {
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    #[validate(range(max = 60000))]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Tenant store connection. Without `url` the binary falls back to an
/// in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    #[validate(url)]
    pub url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_table")]
    #[validate(length(min = 1, max = 63))]
    pub table: String,

    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
}

fn default_table() -> String {
    "organizations".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: default_table(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    #[validate(length(min = 1, max = 255))]
    pub bind_address: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level")),
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}
