//! Shared test fixtures for the tenancy workspace.
//!
//! Provides:
//! - Sample organization records and a seeded in-memory store
//! - `ScriptedStore`, a store wrapper that injects failures, counts lookups
//!   and can hold lookups in flight until released

mod fixtures;
mod scripted;

pub use fixtures::*;
pub use scripted::ScriptedStore;
