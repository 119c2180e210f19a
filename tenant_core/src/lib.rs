//! # Tenant Core
//!
//! Shared types and traits for tenant resolution.
//!
//! This crate provides:
//! - Identifier and record types for organizations (tenants)
//! - The hostname verdict produced by classification
//! - The tenant context state and the read-only snapshot consumers see
//! - The `TenantStore` trait implemented by storage adapters

pub mod traits;
pub mod types;

pub use traits::TenantStore;
pub use types::{
    AccessMode, HostnameVerdict, TenantContext, TenantField, TenantFilter, TenantId,
    TenantIdentity, TenantRecord, TenantSnapshot, VerdictKind, parse_hyphenated_uuid,
};
