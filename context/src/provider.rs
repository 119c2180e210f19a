//! Tenant context provider.
//!
//! Owns the only mutable tenant state of a session. Resolution runs on a
//! spawned task; its result is applied only if the generation it captured
//! is still current, so a completion that raced a retry, invalidate or
//! navigation is discarded.
//!
//! ```text
//! Init ──first access──▶ Resolving ──▶ Ready | Failed
//!                            ▲                 │
//!                            └──── retry() ────┘
//! navigate(): any phase ──▶ Resolving (new generation)
//! invalidate(): any phase ──▶ Init (new generation)
//! ```

use std::sync::{Arc, Weak};

use errors::ResolutionError;
use parking_lot::Mutex;
use tenant_core::{AccessMode, TenantContext, TenantSnapshot};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::classifier::HostnameClassifier;
use crate::navigation::{NavigationTarget, ResolutionTarget};
use crate::resolver::{Resolution, TenantResolver};
use crate::telemetry::{ResolutionTimer, Telemetry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPhase {
    Init,
    Resolving,
    Ready,
    Failed,
}

#[derive(Debug)]
struct ProviderState {
    phase: ProviderPhase,
    generation: u64,
    target: NavigationTarget,
    context: TenantContext,
}

struct Inner {
    classifier: HostnameClassifier,
    resolver: TenantResolver,
    state: Mutex<ProviderState>,
    sender: watch::Sender<TenantSnapshot>,
}

/// Holds and broadcasts the tenant context for one navigation session.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct TenantContextProvider {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TenantContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantContextProvider")
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}

impl TenantContextProvider {
    /// Nothing is resolved until a consumer first reads the context.
    pub fn new(
        classifier: HostnameClassifier,
        resolver: TenantResolver,
        target: NavigationTarget,
    ) -> Self {
        let state = ProviderState {
            phase: ProviderPhase::Init,
            generation: 0,
            target,
            context: TenantContext::Pending,
        };
        let (sender, _) = watch::channel(TenantSnapshot::from_context(&state.context, 0));

        Self {
            inner: Arc::new(Inner {
                classifier,
                resolver,
                state: Mutex::new(state),
                sender,
            }),
        }
    }

    /// Current read-only view. Starts resolution on first access.
    ///
    /// # Panics
    ///
    /// Starting a resolution spawns a task, so the first access must happen
    /// inside a Tokio runtime.
    pub fn snapshot(&self) -> TenantSnapshot {
        self.ensure_started();
        self.inner.sender.borrow().clone()
    }

    /// Receiver of every published snapshot. Starts resolution on first
    /// access.
    pub fn subscribe(&self) -> watch::Receiver<TenantSnapshot> {
        self.ensure_started();
        self.inner.sender.subscribe()
    }

    /// Wait until the context is ready or failed.
    ///
    /// An invalidation while waiting restarts resolution rather than
    /// returning the pending snapshot.
    pub async fn ready(&self) -> TenantSnapshot {
        let mut receiver = self.subscribe();
        loop {
            {
                let current = receiver.borrow_and_update();
                if current.is_ready || current.is_failed() {
                    return current.clone();
                }
            }

            if receiver.changed().await.is_err() {
                return self.inner.sender.borrow().clone();
            }
            self.ensure_started();
        }
    }

    /// Re-run classification and lookup from scratch.
    ///
    /// A no-op while a resolution is in flight; that resolution's result is
    /// authoritative.
    pub fn retry(&self) {
        let mut state = self.inner.state.lock();
        if state.phase == ProviderPhase::Resolving {
            debug!(
                "Retry ignored, generation {} still resolving",
                state.generation,
            );
            return;
        }
        info!("Retrying tenant resolution for {}", state.target);
        self.begin(&mut state);
    }

    /// Drop the current context. In-flight results are discarded and the
    /// next access resolves again.
    pub fn invalidate(&self) {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        state.phase = ProviderPhase::Init;
        state.context = TenantContext::Pending;
        debug!(
            "Invalidated tenant context, generation now {}",
            state.generation,
        );
        self.publish(&state);
    }

    /// Full page navigation: swap the target and resolve it afresh.
    pub fn navigate(&self, target: NavigationTarget) {
        let mut state = self.inner.state.lock();
        debug!("Navigating from {} to {}", state.target, target);
        state.target = target;
        self.begin(&mut state);
    }

    pub fn phase(&self) -> ProviderPhase {
        self.inner.state.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    pub fn target(&self) -> NavigationTarget {
        self.inner.state.lock().target.clone()
    }

    pub fn context(&self) -> TenantContext {
        self.inner.state.lock().context.clone()
    }

    fn ensure_started(&self) {
        let mut state = self.inner.state.lock();
        if state.phase == ProviderPhase::Init {
            self.begin(&mut state);
        }
    }

    fn begin(&self, state: &mut ProviderState) {
        state.generation += 1;
        state.phase = ProviderPhase::Resolving;
        state.context = TenantContext::Pending;
        self.publish(state);

        let generation = state.generation;
        let plan = ResolutionTarget::plan(&self.inner.classifier, &state.target);
        let resolver = self.inner.resolver.clone();
        let provider = Arc::downgrade(&self.inner);

        debug!(
            "Starting resolution generation {} for {} ({})",
            generation, state.target, plan.verdict,
        );

        tokio::spawn(async move {
            let timer = ResolutionTimer::new();
            let outcome = resolver.resolve_target(&plan).await;
            timer.finish();
            complete(provider, generation, plan.access_mode, outcome);
        });
    }

    fn publish(&self, state: &ProviderState) {
        publish(&self.inner, state);
    }
}

fn publish(inner: &Inner, state: &ProviderState) {
    inner
        .sender
        .send_replace(TenantSnapshot::from_context(&state.context, state.generation));
}

fn complete(
    provider: Weak<Inner>,
    generation: u64,
    access_mode: AccessMode,
    outcome: Result<Resolution, ResolutionError>,
) {
    let Some(inner) = provider.upgrade() else {
        debug!(
            "Provider dropped before generation {} completed",
            generation,
        );
        return;
    };

    let mut state = inner.state.lock();
    if state.generation != generation {
        debug!(
            "Discarding stale resolution generation {} (current {})",
            generation, state.generation,
        );
        Telemetry::record_stale_discard();
        return;
    }

    match outcome {
        Ok(resolution) => {
            let tenant = resolution.record().map(|record| record.identity());
            match &tenant {
                Some(identity) => info!(
                    "Tenant context ready: {} ({}) via {}",
                    identity.display_name, identity.id, access_mode,
                ),
                None => info!("Tenant context ready: platform via {}", access_mode),
            }
            Telemetry::record_resolution("ready");
            state.phase = ProviderPhase::Ready;
            state.context = TenantContext::Ready {
                tenant,
                access_mode,
            };
        }
        Err(error) => {
            warn!("Tenant resolution for {} failed: {}", state.target, error);
            Telemetry::record_resolution(&error.kind().to_string());
            state.phase = ProviderPhase::Failed;
            state.context = TenantContext::Failed {
                kind: error.kind(),
                message: error.to_string(),
            };
        }
    }

    publish(&inner, &state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::RetryPolicy;
    use errors::ResolutionErrorKind;
    use std::time::Duration;
    use testing::{ScriptedStore, acme, domains, fast_retry, seeded_store};

    fn provider_for(store: Arc<ScriptedStore>, url: &str) -> TenantContextProvider {
        TenantContextProvider::new(
            HostnameClassifier::new(&domains()),
            TenantResolver::new(store, RetryPolicy::from(&fast_retry(3))),
            NavigationTarget::parse(url),
        )
    }

    fn scripted() -> Arc<ScriptedStore> {
        Arc::new(ScriptedStore::new(seeded_store()))
    }

    async fn wait_for_calls(store: &ScriptedStore, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.call_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("store was not called in time");
    }

    #[tokio::test]
    async fn test_nothing_resolves_before_first_access() {
        let store = scripted();
        let provider = provider_for(store.clone(), "acme.church-os.com");

        tokio::task::yield_now().await;
        assert_eq!(provider.phase(), ProviderPhase::Init);
        assert_eq!(provider.generation(), 0);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_first_access_is_pending_then_ready() {
        let store = scripted();
        store.hold();
        let provider = provider_for(store.clone(), "acme.church-os.com");

        let first = provider.snapshot();
        assert!(!first.is_ready);
        assert!(!first.is_failed());
        assert_eq!(first.generation, 1);
        assert_eq!(provider.phase(), ProviderPhase::Resolving);

        store.release();
        let snapshot = provider.ready().await;
        assert!(snapshot.is_ready);
        assert_eq!(snapshot.tenant_id, Some(acme().id));
        assert_eq!(snapshot.access_mode, Some(AccessMode::SubdomainAccess));
        assert_eq!(provider.phase(), ProviderPhase::Ready);
    }

    #[tokio::test]
    async fn test_retry_is_noop_while_resolving() {
        let store = scripted();
        store.hold();
        let provider = provider_for(store.clone(), "acme.church-os.com");

        provider.snapshot();
        wait_for_calls(&store, 1).await;
        provider.retry();
        provider.retry();
        assert_eq!(provider.generation(), 1);

        store.release();
        provider.ready().await;
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_reresolves() {
        let store = scripted();
        store.fail_always(ScriptedStore::transient_error());
        let provider = provider_for(store.clone(), "acme.church-os.com");

        let failed = provider.ready().await;
        assert_eq!(failed.error_kind, Some(ResolutionErrorKind::LookupFailed));
        assert_eq!(provider.phase(), ProviderPhase::Failed);

        store.heal();
        provider.retry();
        let snapshot = provider.ready().await;
        assert!(snapshot.is_ready);
        assert_eq!(snapshot.generation, 2);
        assert_eq!(store.call_count(), 4);
    }

    #[tokio::test]
    async fn test_invalidate_discards_in_flight_result() {
        let store = scripted();
        store.hold();
        let provider = provider_for(store.clone(), "acme.church-os.com");

        provider.snapshot();
        wait_for_calls(&store, 1).await;
        provider.invalidate();
        assert_eq!(provider.phase(), ProviderPhase::Init);
        assert_eq!(provider.generation(), 2);

        store.release();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(provider.context(), TenantContext::Pending);

        let snapshot = provider.ready().await;
        assert!(snapshot.is_ready);
        assert_eq!(snapshot.generation, 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = scripted();
        let provider = provider_for(store, "ghost.church-os.com");

        let mut receiver = provider.subscribe();
        let failed = receiver
            .wait_for(|snapshot| snapshot.is_failed())
            .await
            .unwrap()
            .clone();
        assert_eq!(failed.error_kind, Some(ResolutionErrorKind::TenantNotFound));
        assert!(failed.error_message.unwrap().contains("ghost"));
    }
}
