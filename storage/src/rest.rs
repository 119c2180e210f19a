//! REST tenant store.
//!
//! Queries a PostgREST-compatible endpoint:
//!
//! ```text
//! GET {base_url}/rest/v1/{table}?{column}={op}.{value}&select=...&limit=1
//! apikey: {api_key}
//! Authorization: Bearer {api_key}
//! ```
//!
//! Ids match with `eq`. Subdomain labels and custom domains match with
//! `ilike` and escaped wildcards, so the lookup is case-insensitive like
//! hostnames themselves.
//!
//! The response is always a JSON array; an empty array means no match.

use std::time::Duration;

use async_trait::async_trait;
use errors::StoreError;
use reqwest::{Client, StatusCode, Url};
use tenant_core::{TenantField, TenantFilter, TenantRecord, TenantStore};
use tracing::{debug, trace};

const BACKEND: &str = "rest";
const SELECT_COLUMNS: &str = "id,name,subdomain,custom_domain,website_enabled";

pub struct RestTenantStore {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RestTenantStore {
    /// Create a store for `table` under `base_url`.
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let endpoint = Url::parse(&format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table))
            .map_err(|e| StoreError::QueryError {
                backend: BACKEND.to_string(),
                reason: format!("invalid store url {base_url}: {e}"),
            })?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::ConnectionError {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    fn query_url(&self, filter: &TenantFilter) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(filter.field.column(), &filter_expression(filter))
            .append_pair("select", SELECT_COLUMNS)
            .append_pair("limit", "1");
        url
    }
}

fn filter_expression(filter: &TenantFilter) -> String {
    match filter.field {
        TenantField::Id => format!("eq.{}", filter.value),
        TenantField::SubdomainLabel | TenantField::CustomDomain => {
            let mut pattern = String::with_capacity(filter.value.len());
            for c in filter.value.chars() {
                if matches!(c, '\\' | '%' | '_' | '*') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            format!("ilike.{pattern}")
        }
    }
}

fn classify_status(status: StatusCode, body: String) -> StoreError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        StoreError::Unavailable {
            backend: BACKEND.to_string(),
            status: status.as_u16(),
        }
    } else {
        StoreError::QueryError {
            backend: BACKEND.to_string(),
            reason: format!("{status}: {body}"),
        }
    }
}

#[async_trait]
impl TenantStore for RestTenantStore {
    async fn find_one(&self, filter: &TenantFilter) -> Result<Option<TenantRecord>, StoreError> {
        let url = self.query_url(filter);
        trace!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::ConnectionError {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let rows: Vec<TenantRecord> =
            response
                .json()
                .await
                .map_err(|e| StoreError::SerializationError {
                    error_type: "json".to_string(),
                    reason: e.to_string(),
                })?;

        debug!("Store returned {} row(s) for {}", rows.len(), filter);
        Ok(rows.into_iter().next())
    }

    fn backend(&self) -> &str {
        BACKEND
    }
}
