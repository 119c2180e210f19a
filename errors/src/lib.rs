//! # Tenant Resolution Errors
//!
//! Error taxonomy shared by the store adapters, the resolver and the
//! context provider.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields everywhere so messages stay self-describing
//! - Store errors classify themselves as transient or permanent; the
//!   resolver's retry policy keys off that classification only

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Terminal outcome categories of a tenant resolution.
///
/// The wire/display form is `SCREAMING_SNAKE_CASE` (`TENANT_NOT_FOUND`) so
/// the value can be shown verbatim on diagnostic pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionErrorKind {
    InvalidHost,
    TenantNotFound,
    TenantDisabled,
    LookupFailed,
}

/// Resolution failures surfaced to the context provider.
///
/// The resolver returns these as values; it never panics past its own
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Domain not configured: {hostname}")]
    InvalidHost { hostname: String },

    #[error("No organization is registered for {identifier}")]
    TenantNotFound { identifier: String },

    #[error("The website for {tenant_name} is currently disabled")]
    TenantDisabled { tenant_name: String },

    #[error("Tenant lookup failed after {attempts} attempt(s): {cause}")]
    LookupFailed { attempts: u32, cause: String },
}

impl ResolutionError {
    pub fn kind(&self) -> ResolutionErrorKind {
        match self {
            Self::InvalidHost { .. } => ResolutionErrorKind::InvalidHost,
            Self::TenantNotFound { .. } => ResolutionErrorKind::TenantNotFound,
            Self::TenantDisabled { .. } => ResolutionErrorKind::TenantDisabled,
            Self::LookupFailed { .. } => ResolutionErrorKind::LookupFailed,
        }
    }

    /// Only exhausted lookups are worth a manual retry; the other kinds are
    /// configuration or registration problems.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LookupFailed { .. })
    }
}

/// Tenant store errors.
///
/// Zero matching rows is not an error: stores return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Connection to {backend} failed: {reason}")]
    ConnectionError { backend: String, reason: String },

    #[error("{backend} unavailable (status {status})")]
    Unavailable { backend: String, status: u16 },

    #[error("Query on {backend} failed: {reason}")]
    QueryError { backend: String, reason: String },

    #[error("Serialization error: {error_type} - {reason}")]
    SerializationError { error_type: String, reason: String },
}

impl StoreError {
    /// Transient faults are retried by the resolver; permanent ones are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError { .. } | Self::Unavailable { .. },
        )
    }
}
