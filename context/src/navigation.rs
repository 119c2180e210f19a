//! Navigation targets and explicit tenant overrides.
//!
//! A navigation is the hostname plus the path and query a consumer is
//! looking at. Admin and preview flows may pin a tenant explicitly with a
//! `/preview/<id>` path segment or an `?org=<id>` query parameter; such an
//! override takes precedence over whatever the hostname says.

use tenant_core::{AccessMode, HostnameVerdict, TenantId};
use tracing::{debug, warn};

use crate::classifier::{HostnameClassifier, normalize_hostname};

const PREVIEW_SEGMENT: &str = "preview";
const ORG_PARAM: &str = "org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub hostname: String,
    pub path: String,
    pub query: Option<String>,
}

impl NavigationTarget {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            path: "/".to_string(),
            query: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        let query = query.trim_start_matches('?');
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    /// Parse `https://host:port/path?query#fragment` or a bare `host/path`.
    /// The fragment is dropped; it never reaches a server.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let without_scheme = input.split_once("://").map_or(input, |(_, rest)| rest);
        let without_fragment = without_scheme
            .split_once('#')
            .map_or(without_scheme, |(head, _)| head);

        let (location, query) = match without_fragment.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (without_fragment, None),
        };
        let (authority, path) = match location.find('/') {
            Some(index) => location.split_at(index),
            None => (location, "/"),
        };

        let mut target = Self::new(normalize_hostname(authority)).with_path(path);
        if let Some(query) = query {
            target = target.with_query(query);
        }
        target
    }

    /// Explicit tenant override carried by the path or query, if any.
    ///
    /// The path segment wins over the query parameter. Malformed ids are
    /// ignored with a warning so the hostname decides instead.
    pub fn tenant_override(&self) -> Option<TenantOverride> {
        if let Some(raw) = self.preview_segment() {
            match TenantId::parse(raw) {
                Some(id) => {
                    return Some(TenantOverride {
                        id,
                        source: OverrideSource::PreviewPath,
                    });
                }
                None => warn!("Ignoring malformed preview id in path: {:?}", raw),
            }
        }

        if let Some(raw) = self.query_param(ORG_PARAM) {
            match TenantId::parse(raw) {
                Some(id) => {
                    return Some(TenantOverride {
                        id,
                        source: OverrideSource::OrgQuery,
                    });
                }
                None => warn!("Ignoring malformed org parameter: {:?}", raw),
            }
        }

        None
    }

    fn preview_segment(&self) -> Option<&str> {
        let mut segments = self.path.split('/').filter(|s| !s.is_empty());
        while let Some(segment) = segments.next() {
            if segment.eq_ignore_ascii_case(PREVIEW_SEGMENT) {
                return segments.next();
            }
        }
        None
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.hostname, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    PreviewPath,
    OrgQuery,
}

impl std::fmt::Display for OverrideSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreviewPath => write!(f, "/{PREVIEW_SEGMENT}/<id>"),
            Self::OrgQuery => write!(f, "?{ORG_PARAM}=<id>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantOverride {
    pub id: TenantId,
    pub source: OverrideSource,
}

/// What the resolver should look up for a navigation, and how the tenant
/// was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTarget {
    pub verdict: HostnameVerdict,
    pub access_mode: AccessMode,
}

impl ResolutionTarget {
    /// Classify the hostname and apply any explicit override.
    ///
    /// An override turns the verdict into an id lookup. Access mode follows
    /// the hostname: the main domain gives `MainDomainAccess`, anything else
    /// `SubdomainAccess`.
    pub fn plan(classifier: &HostnameClassifier, target: &NavigationTarget) -> Self {
        let host_verdict = classifier.classify(&target.hostname);
        let access_mode = match host_verdict {
            HostnameVerdict::MainDomain => AccessMode::MainDomainAccess,
            _ => AccessMode::SubdomainAccess,
        };

        let verdict = match target.tenant_override() {
            Some(TenantOverride { id, source }) => {
                debug!(
                    "Override {} pins tenant {} over host verdict {}",
                    source, id, host_verdict,
                );
                HostnameVerdict::DevPreviewId { id: *id.as_uuid() }
            }
            None => host_verdict,
        };

        Self {
            verdict,
            access_mode,
        }
    }
}
