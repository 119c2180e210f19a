//! Core traits for tenant lookup

use async_trait::async_trait;
use errors::StoreError;

use crate::types::{TenantFilter, TenantRecord};

/// Read-only access to organization records.
///
/// Implementations must report "no matching record" as `Ok(None)` and
/// reserve `Err` for actual faults, classified through
/// [`StoreError::is_transient`].
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_one(&self, filter: &TenantFilter) -> Result<Option<TenantRecord>, StoreError>;

    /// Backend name used in logs and error messages.
    fn backend(&self) -> &str;
}
