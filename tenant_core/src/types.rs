use errors::ResolutionErrorKind;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Parses a canonical hyphenated UUID (`8-4-4-4-12` hex digits).
///
/// The simple, braced and URN forms that `Uuid::try_parse` also accepts are
/// rejected: a hostname label only ever carries the hyphenated form.
pub fn parse_hyphenated_uuid(value: &str) -> Option<Uuid> {
    if value.len() != 36 {
        return None;
    }
    Uuid::try_parse(value).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn parse(value: &str) -> Option<Self> {
        parse_hyphenated_uuid(value).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// An organization as stored by the platform backend.
///
/// Field names on the wire follow the backend's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,

    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(rename = "subdomain", default)]
    pub subdomain_label: Option<String>,

    #[serde(default)]
    pub custom_domain: Option<String>,

    #[serde(rename = "website_enabled", default)]
    pub is_servable: bool,
}

impl TenantRecord {
    pub fn new(id: TenantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            subdomain_label: None,
            custom_domain: None,
            is_servable: true,
        }
    }

    pub fn with_subdomain(mut self, label: impl Into<String>) -> Self {
        self.subdomain_label = Some(label.into());
        self
    }

    pub fn with_custom_domain(mut self, domain: impl Into<String>) -> Self {
        self.custom_domain = Some(domain.into());
        self
    }

    pub fn servable(mut self, is_servable: bool) -> Self {
        self.is_servable = is_servable;
        self
    }

    pub fn identity(&self) -> TenantIdentity {
        TenantIdentity {
            id: self.id,
            display_name: self.display_name.clone(),
        }
    }
}

/// The part of a tenant record that travels with a resolved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantIdentity {
    pub id: TenantId,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMode {
    /// Tenant derived from the hostname (subdomain, custom domain, preview host).
    SubdomainAccess,
    /// Platform domain, optionally scoped to a tenant by an explicit override.
    MainDomainAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    MainDomain,
    DevPreviewId,
    CandidateSubdomain,
    Unresolvable,
}

/// Structural classification of a hostname. Computed per resolution
/// attempt, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostnameVerdict {
    MainDomain,
    DevPreviewId { id: Uuid },
    CandidateSubdomain { label: String, hostname: String },
    Unresolvable { hostname: String },
}

impl HostnameVerdict {
    pub fn kind(&self) -> VerdictKind {
        match self {
            Self::MainDomain => VerdictKind::MainDomain,
            Self::DevPreviewId { .. } => VerdictKind::DevPreviewId,
            Self::CandidateSubdomain { .. } => VerdictKind::CandidateSubdomain,
            Self::Unresolvable { .. } => VerdictKind::Unresolvable,
        }
    }

    pub fn candidate(label: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self::CandidateSubdomain {
            label: label.into(),
            hostname: hostname.into(),
        }
    }
}

impl std::fmt::Display for HostnameVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainDomain => write!(f, "MAIN_DOMAIN"),
            Self::DevPreviewId { id } => write!(f, "DEV_PREVIEW_ID({id})"),
            Self::CandidateSubdomain { label, .. } => write!(f, "CANDIDATE_SUBDOMAIN({label})"),
            Self::Unresolvable { hostname } => write!(f, "UNRESOLVABLE({hostname})"),
        }
    }
}

/// Resolution outcome held by the context provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TenantContext {
    #[default]
    Pending,
    /// `tenant` is `None` for the platform (main domain) outcome.
    Ready {
        tenant: Option<TenantIdentity>,
        access_mode: AccessMode,
    },
    Failed {
        kind: ResolutionErrorKind,
        message: String,
    },
}

impl TenantContext {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Read-only view of the tenant context handed to consumers.
///
/// Consumers must not make tenant-scoped decisions while `is_ready` is
/// false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSnapshot {
    pub is_ready: bool,
    pub tenant_id: Option<TenantId>,
    pub display_name: Option<String>,
    pub access_mode: Option<AccessMode>,
    pub error_kind: Option<ResolutionErrorKind>,
    pub error_message: Option<String>,
    pub generation: u64,
}

impl TenantSnapshot {
    pub fn from_context(context: &TenantContext, generation: u64) -> Self {
        let mut snapshot = Self {
            is_ready: false,
            tenant_id: None,
            display_name: None,
            access_mode: None,
            error_kind: None,
            error_message: None,
            generation,
        };

        match context {
            TenantContext::Pending => {}
            TenantContext::Ready {
                tenant,
                access_mode,
            } => {
                snapshot.is_ready = true;
                snapshot.tenant_id = tenant.as_ref().map(|t| t.id);
                snapshot.display_name = tenant.as_ref().map(|t| t.display_name.clone());
                snapshot.access_mode = Some(*access_mode);
            }
            TenantContext::Failed { kind, message } => {
                snapshot.error_kind = Some(*kind);
                snapshot.error_message = Some(message.clone());
            }
        }

        snapshot
    }

    pub fn is_failed(&self) -> bool {
        self.error_kind.is_some()
    }
}

/// Columns a tenant can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TenantField {
    Id,
    SubdomainLabel,
    CustomDomain,
}

impl TenantField {
    /// Backend column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::SubdomainLabel => "subdomain",
            Self::CustomDomain => "custom_domain",
        }
    }
}

/// Equality predicate on a single tenant column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantFilter {
    pub field: TenantField,
    pub value: String,
}

impl TenantFilter {
    pub fn by_id(id: &TenantId) -> Self {
        Self {
            field: TenantField::Id,
            value: id.to_string(),
        }
    }

    pub fn by_subdomain(label: impl Into<String>) -> Self {
        Self {
            field: TenantField::SubdomainLabel,
            value: label.into(),
        }
    }

    pub fn by_custom_domain(hostname: impl Into<String>) -> Self {
        Self {
            field: TenantField::CustomDomain,
            value: hostname.into(),
        }
    }
}

impl std::fmt::Display for TenantFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACME_ID: &str = "55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11";

    #[test]
    fn test_tenant_id_parse_accepts_only_hyphenated_form() {
        let id = TenantId::parse(ACME_ID).unwrap();
        assert_eq!(id.to_string(), ACME_ID);

        assert!(TenantId::parse("55502b1e8c4d4f1a9a570c6c5b9e4a11").is_none());
        assert!(TenantId::parse("{55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11}").is_none());
        assert!(TenantId::parse("urn:uuid:55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11").is_none());
    }

    #[test]
    fn test_parse_hyphenated_uuid() {
        assert!(parse_hyphenated_uuid(ACME_ID).is_some());
        assert!(parse_hyphenated_uuid("55502b1e8c4d4f1a9a570c6c5b9e4a11").is_none());
        assert!(parse_hyphenated_uuid("acme").is_none());
        assert!(parse_hyphenated_uuid("55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a1z").is_none());
    }

    #[test]
    fn test_tenant_record_wire_format() {
        let json = serde_json::json!({
            "id": ACME_ID,
            "name": "Acme Community Church",
            "subdomain": "acme",
            "custom_domain": null,
            "website_enabled": true
        });

        let record: TenantRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id.to_string(), ACME_ID);
        assert_eq!(record.display_name, "Acme Community Church");
        assert_eq!(record.subdomain_label.as_deref(), Some("acme"));
        assert!(record.custom_domain.is_none());
        assert!(record.is_servable);
    }

    #[test]
    fn test_snapshot_from_ready_context() {
        let id = TenantId::parse(ACME_ID).unwrap();
        let context = TenantContext::Ready {
            tenant: Some(TenantIdentity {
                id,
                display_name: "Acme".to_string(),
            }),
            access_mode: AccessMode::SubdomainAccess,
        };

        let snapshot = TenantSnapshot::from_context(&context, 4);
        assert!(snapshot.is_ready);
        assert_eq!(snapshot.tenant_id, Some(id));
        assert_eq!(snapshot.access_mode, Some(AccessMode::SubdomainAccess));
        assert!(snapshot.error_message.is_none());
        assert_eq!(snapshot.generation, 4);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["isReady"], true);
        assert_eq!(json["accessMode"], "SUBDOMAIN_ACCESS");
    }

    #[test]
    fn test_snapshot_from_failed_context() {
        let context = TenantContext::Failed {
            kind: ResolutionErrorKind::TenantNotFound,
            message: "No organization is registered for ghost".to_string(),
        };

        let snapshot = TenantSnapshot::from_context(&context, 1);
        assert!(!snapshot.is_ready);
        assert!(snapshot.is_failed());
        assert!(snapshot.tenant_id.is_none());
        assert_eq!(
            snapshot.error_kind,
            Some(ResolutionErrorKind::TenantNotFound),
        );
    }

    #[test]
    fn test_verdict_display() {
        let verdict = HostnameVerdict::candidate("acme", "acme.church-os.com");
        assert_eq!(verdict.kind(), VerdictKind::CandidateSubdomain);
        assert_eq!(verdict.to_string(), "CANDIDATE_SUBDOMAIN(acme)");
        assert_eq!(HostnameVerdict::MainDomain.to_string(), "MAIN_DOMAIN");
    }

    #[test]
    fn test_filter_columns() {
        assert_eq!(
            TenantFilter::by_subdomain("acme").field.column(),
            "subdomain",
        );
        assert_eq!(
            TenantFilter::by_custom_domain("gracechurch.org").to_string(),
            "custom_domain=gracechurch.org",
        );
    }
}
