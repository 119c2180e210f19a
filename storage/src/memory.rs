use async_trait::async_trait;
use errors::StoreError;
use parking_lot::RwLock;
use tenant_core::{TenantField, TenantFilter, TenantRecord, TenantStore};

/// Tenant store held in process memory.
///
/// Subdomain labels and custom domains match case-insensitively, like DNS.
#[derive(Debug, Default)]
pub struct InMemoryTenantStore {
    records: RwLock<Vec<TenantRecord>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TenantRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Insert or replace a record by id.
    pub fn upsert(&self, record: TenantRecord) {
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn matches(record: &TenantRecord, filter: &TenantFilter) -> bool {
    match filter.field {
        TenantField::Id => record.id.to_string().eq_ignore_ascii_case(&filter.value),
        TenantField::SubdomainLabel => record
            .subdomain_label
            .as_deref()
            .is_some_and(|label| label.eq_ignore_ascii_case(&filter.value)),
        TenantField::CustomDomain => record
            .custom_domain
            .as_deref()
            .is_some_and(|domain| domain.eq_ignore_ascii_case(&filter.value)),
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn find_one(&self, filter: &TenantFilter) -> Result<Option<TenantRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| matches(record, filter))
            .cloned())
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
