//! Tenant resolution for Church OS.
//!
//! Every request or page load is mapped to the organization it belongs to:
//!
//! 1. [`HostnameClassifier`] places the hostname in a structural category
//!    (main domain, preview host with an embedded id, candidate subdomain).
//! 2. [`ResolutionTarget::plan`] applies explicit `/preview/<id>` or
//!    `?org=<id>` overrides.
//! 3. [`TenantResolver`] looks the tenant up, retrying transient store
//!    faults, and validates that it may be served.
//! 4. [`TenantContextProvider`] holds the outcome and broadcasts snapshots
//!    to consumers ([`RouteGate`], [`TenantScope`], [`LinkRewriter`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use context::{
//!     HostnameClassifier, NavigationTarget, RetryPolicy, TenantContextProvider, TenantResolver,
//! };
//!
//! let provider = TenantContextProvider::new(
//!     HostnameClassifier::new(&config.domains),
//!     TenantResolver::new(Arc::new(store), RetryPolicy::from(&config.resolver)),
//!     NavigationTarget::parse("https://acme.church-os.com/events"),
//! );
//! let snapshot = provider.ready().await;
//! println!("Tenant: {:?}", snapshot.tenant_id);
//! ```

pub mod classifier;
pub mod consumer;
pub mod navigation;
pub mod provider;
pub mod resolver;
pub mod telemetry;

pub use classifier::{HostnameClassifier, normalize_hostname};
pub use consumer::{GateDecision, LinkRewriter, Remedy, RouteGate, ScopeError, TenantScope};
pub use navigation::{NavigationTarget, OverrideSource, ResolutionTarget, TenantOverride};
pub use provider::{ProviderPhase, TenantContextProvider};
pub use resolver::{Resolution, RetryPolicy, TenantResolver};
