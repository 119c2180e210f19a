//! The `churchos` binary: classify hostnames, resolve tenants, and serve
//! tenant-aware HTTP.

pub mod commands;
pub mod output;
pub mod server;
pub mod tenancy;
pub mod ux_error;
