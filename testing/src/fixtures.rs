use config::{DomainConfig, ResolverConfig};
use storage::InMemoryTenantStore;
use tenant_core::{TenantId, TenantRecord};
use uuid::Uuid;

pub const ACME_ID: &str = "0b7e3f4c-2a61-4d8e-9f0a-3c5d7e9b1a24";
pub const GRACE_ID: &str = "7c1d2e3f-4a5b-4c6d-8e7f-9a0b1c2d3e4f";
pub const DORMANT_ID: &str = "55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11";

fn tenant_id(raw: &str) -> TenantId {
    TenantId::new(Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::nil()))
}

/// Servable tenant on `acme.church-os.com`.
pub fn acme() -> TenantRecord {
    TenantRecord::new(tenant_id(ACME_ID), "Acme Community Church").with_subdomain("acme")
}

/// Servable tenant with its own domain.
pub fn grace() -> TenantRecord {
    TenantRecord::new(tenant_id(GRACE_ID), "Grace Fellowship")
        .with_subdomain("grace")
        .with_custom_domain("www.gracechurch.org")
}

/// Tenant whose website is switched off.
pub fn dormant() -> TenantRecord {
    TenantRecord::new(tenant_id(DORMANT_ID), "Dormant Chapel")
        .with_subdomain("dormant")
        .servable(false)
}

pub fn seeded_store() -> InMemoryTenantStore {
    InMemoryTenantStore::with_records([acme(), grace(), dormant()])
}

/// Production-like domain configuration (`church-os.com`).
pub fn domains() -> DomainConfig {
    DomainConfig::default()
}

pub fn development_domains() -> DomainConfig {
    DomainConfig {
        development: true,
        ..DomainConfig::default()
    }
}

/// Retry policy with millisecond backoff so tests stay fast.
pub fn fast_retry(max_attempts: u32) -> ResolverConfig {
    ResolverConfig {
        max_attempts,
        backoff_ms: 1,
    }
}
