//! # Storage Layer
//!
//! Tenant store adapters: an in-memory store for development and tests, and
//! a REST store speaking the PostgREST query dialect of the hosted backend.

pub mod memory;
pub mod rest;

pub use memory::InMemoryTenantStore;
pub use rest::RestTenantStore;
