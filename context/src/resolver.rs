//! Tenant lookup for classified hostnames.
//!
//! The resolver turns a [`HostnameVerdict`] into a tenant record (or the
//! platform outcome) by querying the [`TenantStore`]. Transient store faults
//! are retried with linear backoff; every other outcome is final. Errors are
//! returned as values, never panics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use config::ResolverConfig;
use errors::{ResolutionError, StoreError};
use tenant_core::{HostnameVerdict, TenantField, TenantFilter, TenantId, TenantRecord, TenantStore};
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use crate::navigation::ResolutionTarget;
use crate::telemetry::Telemetry;

/// Bounded linear backoff: the delay before retry `n` is `n * backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one try.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Delays between consecutive tries; one fewer than `max_attempts`.
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        let backoff = self.backoff;
        (1..self.max_attempts).map(move |n| backoff * n)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ResolverConfig::default())
    }
}

impl From<&ResolverConfig> for RetryPolicy {
    fn from(config: &ResolverConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_ms),
        )
    }
}

/// Successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Main domain: no tenant, the platform itself is served.
    Platform,
    Tenant {
        record: TenantRecord,
        matched_by: TenantField,
    },
}

impl Resolution {
    pub fn record(&self) -> Option<&TenantRecord> {
        match self {
            Self::Platform => None,
            Self::Tenant { record, .. } => Some(record),
        }
    }
}

#[derive(Clone)]
pub struct TenantResolver {
    store: Arc<dyn TenantStore>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("store", &self.store.backend())
            .field("policy", &self.policy)
            .finish()
    }
}

impl TenantResolver {
    pub fn new(store: Arc<dyn TenantStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Resolve a planned navigation target.
    pub async fn resolve_target(
        &self,
        target: &ResolutionTarget,
    ) -> Result<Resolution, ResolutionError> {
        self.resolve(&target.verdict).await
    }

    /// Resolve a hostname verdict.
    ///
    /// - `MainDomain` yields [`Resolution::Platform`] without touching the store.
    /// - `DevPreviewId` looks the tenant up by id.
    /// - `CandidateSubdomain` tries the subdomain label, then the full
    ///   hostname as a custom domain.
    /// - `Unresolvable` fails with `InvalidHost` without querying.
    pub async fn resolve(&self, verdict: &HostnameVerdict) -> Result<Resolution, ResolutionError> {
        let resolution = match verdict {
            HostnameVerdict::MainDomain => return Ok(Resolution::Platform),
            HostnameVerdict::Unresolvable { hostname } => {
                return Err(ResolutionError::InvalidHost {
                    hostname: hostname.clone(),
                });
            }
            HostnameVerdict::DevPreviewId { id } => {
                let id = TenantId::from(*id);
                self.lookup(TenantFilter::by_id(&id))
                    .await?
                    .map(|record| Resolution::Tenant {
                        record,
                        matched_by: TenantField::Id,
                    })
                    .ok_or_else(|| ResolutionError::TenantNotFound {
                        identifier: id.to_string(),
                    })?
            }
            HostnameVerdict::CandidateSubdomain { label, hostname } => {
                self.resolve_candidate(label, hostname).await?
            }
        };

        if let Some(record) = resolution.record() {
            if !record.is_servable {
                info!(
                    "Tenant {} ({}) is not servable",
                    record.display_name,
                    record.id,
                );
                return Err(ResolutionError::TenantDisabled {
                    tenant_name: record.display_name.clone(),
                });
            }
        }

        Ok(resolution)
    }

    async fn resolve_candidate(
        &self,
        label: &str,
        hostname: &str,
    ) -> Result<Resolution, ResolutionError> {
        if let Some(record) = self.lookup(TenantFilter::by_subdomain(label)).await? {
            return Ok(Resolution::Tenant {
                record,
                matched_by: TenantField::SubdomainLabel,
            });
        }

        if hostname != label {
            debug!(
                "No subdomain match for {}, trying custom domain {}",
                label,
                hostname,
            );
            if let Some(record) = self.lookup(TenantFilter::by_custom_domain(hostname)).await? {
                return Ok(Resolution::Tenant {
                    record,
                    matched_by: TenantField::CustomDomain,
                });
            }
        }

        Err(ResolutionError::TenantNotFound {
            identifier: label.to_string(),
        })
    }

    /// One store lookup under the retry policy.
    ///
    /// Only transient faults are retried. Exhaustion and permanent faults
    /// both surface as `LookupFailed` carrying the number of tries made.
    async fn lookup(&self, filter: TenantFilter) -> Result<Option<TenantRecord>, ResolutionError> {
        let attempts = &AtomicU32::new(0);
        let filter = &filter;
        let max_attempts = self.policy.max_attempts;

        let result = RetryIf::start(
            self.policy.delays(),
            move || async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Telemetry::record_lookup_attempt(filter.field.column());
                debug!(
                    "Looking up tenant by {} on {} (attempt {}/{})",
                    filter,
                    self.store.backend(),
                    attempt,
                    max_attempts,
                );
                self.store.find_one(filter).await
            },
            |error: &StoreError| {
                let transient = error.is_transient();
                if transient {
                    warn!("Transient store error looking up {}: {}", filter, error);
                }
                transient
            },
        )
        .await;

        result.map_err(|error| {
            let attempts = attempts.load(Ordering::SeqCst);
            warn!(
                "Tenant lookup by {} failed after {} attempt(s): {}",
                filter,
                attempts,
                error,
            );
            ResolutionError::LookupFailed {
                attempts,
                cause: error.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::ResolutionErrorKind;
    use testing::{ScriptedStore, acme, dormant, fast_retry, grace, seeded_store};
    use uuid::Uuid;

    fn resolver_with(store: Arc<ScriptedStore>, max_attempts: u32) -> TenantResolver {
        TenantResolver::new(store, RetryPolicy::from(&fast_retry(max_attempts)))
    }

    fn scripted() -> Arc<ScriptedStore> {
        Arc::new(ScriptedStore::new(seeded_store()))
    }

    #[test]
    fn test_retry_policy_linear_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(1000), Duration::from_millis(2000)],
        );

        let policy = RetryPolicy::new(0, Duration::from_millis(5));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delays().count(), 0);

        assert_eq!(RetryPolicy::default().max_attempts(), 3);
        assert_eq!(
            RetryPolicy::default().backoff(),
            Duration::from_millis(1000),
        );
    }

    #[tokio::test]
    async fn test_main_domain_skips_store() {
        let store = scripted();
        let resolver = resolver_with(store.clone(), 3);

        let resolution = resolver.resolve(&HostnameVerdict::MainDomain).await.unwrap();
        assert_eq!(resolution, Resolution::Platform);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_is_invalid_host_without_query() {
        let store = scripted();
        let resolver = resolver_with(store.clone(), 3);

        let err = resolver
            .resolve(&HostnameVerdict::Unresolvable {
                hostname: "nowhere.example".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ResolutionErrorKind::InvalidHost);
        assert_eq!(err.to_string(), "Domain not configured: nowhere.example");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_subdomain_match() {
        let store = scripted();
        let resolver = resolver_with(store.clone(), 3);

        let resolution = resolver
            .resolve(&HostnameVerdict::candidate("acme", "acme.church-os.com"))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Tenant {
                record: acme(),
                matched_by: TenantField::SubdomainLabel,
            },
        );
        assert_eq!(store.calls(), vec![TenantFilter::by_subdomain("acme")]);
    }

    #[tokio::test]
    async fn test_custom_domain_fallback() {
        let store = scripted();
        let resolver = resolver_with(store.clone(), 3);

        let resolution = resolver
            .resolve(&HostnameVerdict::candidate("www", "www.gracechurch.org"))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Tenant {
                record: grace(),
                matched_by: TenantField::CustomDomain,
            },
        );
        assert_eq!(
            store.calls(),
            vec![
                TenantFilter::by_subdomain("www"),
                TenantFilter::by_custom_domain("www.gracechurch.org"),
            ],
        );
    }

    #[tokio::test]
    async fn test_not_found_reports_searched_label() {
        let resolver = resolver_with(scripted(), 3);

        let err = resolver
            .resolve(&HostnameVerdict::candidate("ghost", "ghost.church-os.com"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TenantNotFound {
                identifier: "ghost".to_string(),
            },
        );
    }

    #[tokio::test]
    async fn test_preview_id_lookup() {
        let store = scripted();
        let resolver = resolver_with(store.clone(), 3);
        let id = *acme().id.as_uuid();

        let resolution = resolver.resolve(&HostnameVerdict::DevPreviewId { id }).await.unwrap();
        assert_eq!(resolution.record(), Some(&acme()));
        assert_eq!(store.calls(), vec![TenantFilter::by_id(&acme().id)]);

        let unknown = Uuid::new_v4();
        let err = resolver
            .resolve(&HostnameVerdict::DevPreviewId { id: unknown })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TenantNotFound {
                identifier: unknown.to_string(),
            },
        );
    }

    #[tokio::test]
    async fn test_disabled_tenant() {
        let resolver = resolver_with(scripted(), 3);
        let id = *dormant().id.as_uuid();

        let err = resolver.resolve(&HostnameVerdict::DevPreviewId { id }).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TenantDisabled {
                tenant_name: "Dormant Chapel".to_string(),
            },
        );
    }

    #[tokio::test]
    async fn test_transient_errors_recover_within_budget() {
        let store = scripted();
        store.fail_times(2, ScriptedStore::transient_error());
        let resolver = resolver_with(store.clone(), 3);

        let resolution = resolver
            .resolve(&HostnameVerdict::candidate("acme", "acme.church-os.com"))
            .await
            .unwrap();
        assert_eq!(resolution.record(), Some(&acme()));
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_persistent_transient_errors_exhaust_exactly_max_attempts() {
        let store = scripted();
        store.fail_always(ScriptedStore::transient_error());
        let resolver = resolver_with(store.clone(), 4);

        let err = resolver
            .resolve(&HostnameVerdict::candidate("acme", "acme.church-os.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::LookupFailed { attempts: 4, .. }));
        assert!(err.is_retryable());
        assert_eq!(store.call_count(), 4);
        assert!(
            store
                .calls()
                .iter()
                .all(|filter| *filter == TenantFilter::by_subdomain("acme")),
        );
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let store = scripted();
        store.fail_always(ScriptedStore::permanent_error());
        let resolver = resolver_with(store.clone(), 5);

        let err = resolver
            .resolve(&HostnameVerdict::candidate("acme", "acme.church-os.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::LookupFailed { attempts: 1, .. }));
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_linear() {
        let store = scripted();
        store.fail_always(ScriptedStore::transient_error());
        let resolver = TenantResolver::new(
            store.clone(),
            RetryPolicy::new(3, Duration::from_millis(1000)),
        );

        let started = tokio::time::Instant::now();
        let _ = resolver
            .resolve(&HostnameVerdict::candidate("acme", "acme.church-os.com"))
            .await;

        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(3000),
            "elapsed {elapsed:?}",
        );
        assert!(elapsed < Duration::from_millis(4000), "elapsed {elapsed:?}");
        assert_eq!(store.call_count(), 3);
    }
}
