//! Consumer contracts.
//!
//! Consumers (routing, data access, rendering) read [`TenantSnapshot`]s and
//! gate their own behavior on them. None of them classify hostnames or
//! query the store; anything they cannot decide yet is `Wait`/`NotReady`.

use config::DomainConfig;
use errors::ResolutionErrorKind;
use tenant_core::{AccessMode, TenantId, TenantSnapshot};
use thiserror::Error;

/// How a user gets out of a failed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remedy {
    Retry,
    GoToMainDomain { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Context still pending; make no tenant-scoped decision.
    Wait,
    ServePlatform,
    ServeTenant(TenantScope),
    Unavailable {
        kind: ResolutionErrorKind,
        message: String,
        remedy: Remedy,
    },
}

/// Route guard. Every failure maps to a page offering a way out.
#[derive(Debug, Clone)]
pub struct RouteGate {
    main_url: String,
}

impl RouteGate {
    pub fn new(domains: &DomainConfig) -> Self {
        let main = domains
            .main_domains
            .first()
            .unwrap_or(&domains.base_domain);
        Self {
            main_url: format!("https://{main}"),
        }
    }

    pub fn main_url(&self) -> &str {
        &self.main_url
    }

    pub fn decide(&self, snapshot: &TenantSnapshot) -> GateDecision {
        if let Some(kind) = snapshot.error_kind {
            let remedy = match kind {
                ResolutionErrorKind::LookupFailed => Remedy::Retry,
                _ => Remedy::GoToMainDomain {
                    url: self.main_url.clone(),
                },
            };
            return GateDecision::Unavailable {
                kind,
                message: snapshot.error_message.clone().unwrap_or_else(|| kind.to_string()),
                remedy,
            };
        }

        if !snapshot.is_ready {
            return GateDecision::Wait;
        }

        match TenantScope::require(snapshot) {
            Ok(scope) => GateDecision::ServeTenant(scope),
            Err(_) => GateDecision::ServePlatform,
        }
    }
}

/// Proof that a tenant is resolved, required for tenant-scoped data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub tenant_id: TenantId,
    pub access_mode: AccessMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Tenant context is not ready yet")]
    NotReady,

    #[error("No tenant is selected on the main domain")]
    NoTenant,

    #[error("Tenant resolution failed ({kind}): {message}")]
    Failed {
        kind: ResolutionErrorKind,
        message: String,
    },
}

impl TenantScope {
    pub fn require(snapshot: &TenantSnapshot) -> Result<Self, ScopeError> {
        if let Some(kind) = snapshot.error_kind {
            return Err(ScopeError::Failed {
                kind,
                message: snapshot.error_message.clone().unwrap_or_default(),
            });
        }
        if !snapshot.is_ready {
            return Err(ScopeError::NotReady);
        }

        let tenant_id = snapshot.tenant_id.ok_or(ScopeError::NoTenant)?;
        Ok(Self {
            tenant_id,
            access_mode: snapshot.access_mode.unwrap_or(AccessMode::SubdomainAccess),
        })
    }
}

/// Keeps an explicitly selected tenant across internal links on the main
/// domain by carrying `?org=<id>`.
pub struct LinkRewriter;

impl LinkRewriter {
    pub fn rewrite(snapshot: &TenantSnapshot, href: &str) -> String {
        let Some(tenant_id) = snapshot.tenant_id else {
            return href.to_string();
        };
        let main_domain =
            snapshot.is_ready && snapshot.access_mode == Some(AccessMode::MainDomainAccess);
        if !main_domain || !is_internal(href) {
            return href.to_string();
        }

        let (location, fragment) = match href.split_once('#') {
            Some((location, fragment)) => (location, Some(fragment)),
            None => (href, None),
        };

        let already_scoped = location
            .split_once('?')
            .is_some_and(|(_, query)| query.split('&').any(|pair| pair.starts_with("org=")));
        if already_scoped {
            return href.to_string();
        }

        let separator = if location.contains('?') { '&' } else { '?' };
        let mut rewritten = format!("{location}{separator}org={tenant_id}");
        if let Some(fragment) = fragment {
            rewritten.push('#');
            rewritten.push_str(fragment);
        }
        rewritten
    }
}

fn is_internal(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}
