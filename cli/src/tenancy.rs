//! Wiring from configuration to store, classifier and resolver.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{StoreConfig, TenancyConfig};
use context::{
    HostnameClassifier, NavigationTarget, RetryPolicy, RouteGate, TenantContextProvider,
    TenantResolver,
};
use storage::{InMemoryTenantStore, RestTenantStore};
use tenant_core::{TenantRecord, TenantStore};
use tracing::{info, warn};

/// Everything needed to resolve tenants for any number of navigations.
pub struct Tenancy {
    pub config: TenancyConfig,
    classifier: HostnameClassifier,
    resolver: TenantResolver,
}

impl Tenancy {
    pub fn from_config(config: TenancyConfig, seed: Option<&Path>) -> Result<Self> {
        let store = build_store(&config.store, seed)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: TenancyConfig, store: Arc<dyn TenantStore>) -> Self {
        Self {
            classifier: HostnameClassifier::new(&config.domains),
            resolver: TenantResolver::new(store, RetryPolicy::from(&config.resolver)),
            config,
        }
    }

    pub fn classifier(&self) -> &HostnameClassifier {
        &self.classifier
    }

    /// A fresh provider for one navigation.
    pub fn provider(&self, target: NavigationTarget) -> TenantContextProvider {
        TenantContextProvider::new(self.classifier.clone(), self.resolver.clone(), target)
    }

    pub fn gate(&self) -> RouteGate {
        RouteGate::new(&self.config.domains)
    }
}

/// REST store when a URL is configured, otherwise an in-memory store
/// seeded from `seed`.
pub fn build_store(config: &StoreConfig, seed: Option<&Path>) -> Result<Arc<dyn TenantStore>> {
    if let Some(url) = &config.url {
        if seed.is_some() {
            warn!("Ignoring --seed because a store URL is configured");
        }
        let store = RestTenantStore::new(
            url,
            &config.table,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        info!(
            "Using REST tenant store at {} (table {})",
            url,
            config.table,
        );
        return Ok(Arc::new(store));
    }

    let records = match seed {
        Some(path) => load_seed(path)?,
        None => Vec::new(),
    };
    info!(
        "Using in-memory tenant store with {} organization(s)",
        records.len(),
    );
    Ok(Arc::new(InMemoryTenantStore::with_records(records)))
}

/// Read a JSON array of organization records.
pub fn load_seed(path: &Path) -> Result<Vec<TenantRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid seed file {}", path.display()))
}
