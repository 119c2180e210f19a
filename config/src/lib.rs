//! # Configuration System
//!
//! Centralized configuration for tenant resolution.
//!
//! This crate provides:
//! - Configuration structures for domains, retry policy, store and server
//! - Environment variable loading (`CHURCHOS_*`)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation
//!
//! Domain sets live here rather than in the classifier so an environment
//! can be promoted (staging to production) without a code change.

pub mod config;
pub mod error;
pub mod file_loader;
pub mod loader;
pub mod precedence;

pub use config::{
    DomainConfig, ObservabilityConfig, ResolverConfig, ServerConfig, StoreConfig, TenancyConfig,
};
pub use error::ConfigError;
pub use file_loader::{load_from_file, load_from_toml, load_from_yaml};
pub use loader::{ENV_PREFIX, apply_env, apply_env_from, load_from_env};
pub use precedence::load;
pub use validator::Validate;
