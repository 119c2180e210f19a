//! Hostname classification.
//!
//! Rules, in priority order:
//! 1. Main domain (`church-os.com`, `www.church-os.com`) or a local host
//! 2. Preview host carrying a tenant UUID in its first label, or a bare UUID
//! 3. `<label>.<base_domain>`
//! 4. Legacy `<label>.<legacy_segment>.<base_domain>`
//! 5. Development fallback: first label of any multi-label host
//! 6. Unresolvable
//!
//! A UUID is never treated as a subdomain label; UUIDs are reserved for
//! preview and org-id flows.

use std::sync::Arc;

use config::DomainConfig;
use tenant_core::{HostnameVerdict, parse_hyphenated_uuid};
use tracing::debug;
use uuid_label::uuid_in_label;

/// Lowercases, trims, and strips port and trailing dot.
pub fn normalize_hostname(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();
    let host = match host.split_once("://") {
        Some((_, rest)) => rest.to_string(),
        None => host,
    };
    let host = host.split(['/', '?', '#']).next().unwrap_or_default();
    let host = if host.starts_with('[') {
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        host.split(':').next().unwrap_or_default()
    };
    host.trim_end_matches('.').to_string()
}

#[derive(Debug)]
struct Domains {
    base_suffix: String,
    legacy_suffix: String,
    main_domains: Vec<String>,
    local_hosts: Vec<String>,
    preview_suffixes: Vec<String>,
    development: bool,
}

/// Pure hostname classifier. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HostnameClassifier {
    domains: Arc<Domains>,
}

impl HostnameClassifier {
    pub fn new(config: &DomainConfig) -> Self {
        let base = normalize_hostname(&config.base_domain);
        let lower = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| normalize_hostname(v)).collect()
        };

        Self {
            domains: Arc::new(Domains {
                legacy_suffix: format!(".{}.{}", config.legacy_segment.to_ascii_lowercase(), base),
                base_suffix: format!(".{base}"),
                main_domains: lower(&config.main_domains),
                local_hosts: lower(&config.local_hosts),
                preview_suffixes: lower(&config.preview_suffixes),
                development: config.development,
            }),
        }
    }

    /// Classify `hostname`. Total: every input yields exactly one verdict.
    pub fn classify(&self, hostname: &str) -> HostnameVerdict {
        let host = normalize_hostname(hostname);
        let verdict = self.classify_normalized(&host);
        debug!("Classified host {:?} as {}", host, verdict);
        verdict
    }

    fn classify_normalized(&self, host: &str) -> HostnameVerdict {
        if host.is_empty() {
            return HostnameVerdict::Unresolvable {
                hostname: String::new(),
            };
        }

        if self.is_main_domain(host) {
            return HostnameVerdict::MainDomain;
        }

        if let Some(id) = self.preview_id(host) {
            return HostnameVerdict::DevPreviewId { id };
        }

        if let Some(label) = single_label_under(host, &self.domains.base_suffix) {
            return HostnameVerdict::candidate(label, host);
        }

        if let Some(label) = single_label_under(host, &self.domains.legacy_suffix) {
            return HostnameVerdict::candidate(label, host);
        }

        if self.domains.development {
            if let Some((first, _)) = host.split_once('.') {
                if !first.is_empty() && parse_hyphenated_uuid(first).is_none() {
                    return HostnameVerdict::candidate(first, host);
                }
            }
        }

        HostnameVerdict::Unresolvable {
            hostname: host.to_string(),
        }
    }

    fn is_main_domain(&self, host: &str) -> bool {
        let bare = host.strip_prefix("www.").unwrap_or(host);
        self.domains.main_domains.iter().any(|d| d == bare || d == host)
            || self.domains.local_hosts.iter().any(|d| d == host)
    }

    fn preview_id(&self, host: &str) -> Option<uuid::Uuid> {
        if let Some(id) = parse_hyphenated_uuid(host) {
            return Some(id);
        }

        let (first, rest) = host.split_once('.')?;
        let on_preview_domain = self
            .domains
            .preview_suffixes
            .iter()
            .any(|suffix| rest == suffix || rest.ends_with(&format!(".{suffix}")));

        if on_preview_domain {
            uuid_in_label(first)
        } else {
            None
        }
    }
}

/// `label` when `host` is exactly `<label><suffix>` with a usable label.
fn single_label_under<'a>(host: &'a str, suffix: &str) -> Option<&'a str> {
    let label = host.strip_suffix(suffix)?;
    let usable = !label.is_empty()
        && !label.contains('.')
        && label != "www"
        && parse_hyphenated_uuid(label).is_none();
    usable.then_some(label)
}

mod uuid_label {
    use tenant_core::parse_hyphenated_uuid;

    /// UUID carried by a preview label: either the whole label or the part
    /// after the last `--` (`id-preview--<uuid>`).
    pub(super) fn uuid_in_label(label: &str) -> Option<uuid::Uuid> {
        parse_hyphenated_uuid(label).or_else(|| {
            label
                .rsplit_once("--")
                .and_then(|(_, tail)| parse_hyphenated_uuid(tail))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_core::VerdictKind;

    const PREVIEW_ID: &str = "55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11";

    fn production() -> HostnameClassifier {
        HostnameClassifier::new(&DomainConfig::default())
    }

    fn development() -> HostnameClassifier {
        HostnameClassifier::new(&DomainConfig {
            development: true,
            ..DomainConfig::default()
        })
    }

    #[test]
    fn test_normalize_hostname() {
        assert_eq!(
            normalize_hostname("  Acme.Church-OS.com. "),
            "acme.church-os.com",
        );
        assert_eq!(normalize_hostname("localhost:5173"), "localhost");
        assert_eq!(
            normalize_hostname("https://acme.church-os.com/about?x=1"),
            "acme.church-os.com",
        );
        assert_eq!(normalize_hostname(""), "");
    }

    #[test]
    fn test_normalize_ipv6_host_strips_port() {
        assert_eq!(normalize_hostname("[::1]:8080"), "[::1]");
        assert_eq!(normalize_hostname("http://[::1]:5173/events"), "[::1]");
        assert_eq!(normalize_hostname("[::1]"), "[::1]");

        let classifier = production();
        assert_eq!(
            classifier.classify("[::1]:8080"),
            HostnameVerdict::MainDomain,
        );
    }

    #[test]
    fn test_main_domain_and_www_variant() {
        let classifier = production();
        assert_eq!(
            classifier.classify("church-os.com"),
            HostnameVerdict::MainDomain,
        );
        assert_eq!(
            classifier.classify("www.church-os.com"),
            HostnameVerdict::MainDomain,
        );
        assert_eq!(
            classifier.classify("WWW.Church-OS.com:443"),
            HostnameVerdict::MainDomain,
        );
        assert_eq!(
            classifier.classify("localhost"),
            HostnameVerdict::MainDomain,
        );
        assert_eq!(
            classifier.classify("localhost:8080"),
            HostnameVerdict::MainDomain,
        );
    }

    #[test]
    fn test_additional_main_domains() {
        let classifier = HostnameClassifier::new(&DomainConfig {
            main_domains: vec!["church-os.com".to_string(), "churchos.app".to_string()],
            ..DomainConfig::default()
        });
        assert_eq!(
            classifier.classify("www.churchos.app"),
            HostnameVerdict::MainDomain,
        );
    }

    #[test]
    fn test_candidate_subdomain() {
        let classifier = production();
        assert_eq!(
            classifier.classify("acme.church-os.com"),
            HostnameVerdict::candidate("acme", "acme.church-os.com"),
        );
        assert_eq!(
            classifier.classify("ghost.church-os.com"),
            HostnameVerdict::candidate("ghost", "ghost.church-os.com"),
        );
    }

    #[test]
    fn test_uuid_label_under_base_domain_is_never_a_candidate() {
        let classifier = production();
        let host = format!("{PREVIEW_ID}.church-os.com");
        assert_ne!(
            classifier.classify(&host).kind(),
            VerdictKind::CandidateSubdomain,
        );
    }

    #[test]
    fn test_nested_labels_are_not_candidates() {
        let classifier = production();
        assert_eq!(
            classifier.classify("a.b.church-os.com").kind(),
            VerdictKind::Unresolvable,
        );
        assert_eq!(
            classifier.classify(".church-os.com").kind(),
            VerdictKind::Unresolvable,
        );
    }

    #[test]
    fn test_preview_domains() {
        let classifier = production();
        let expected = HostnameVerdict::DevPreviewId {
            id: parse_hyphenated_uuid(PREVIEW_ID).unwrap(),
        };

        assert_eq!(
            classifier.classify(&format!("{PREVIEW_ID}.lovableproject.com")),
            expected,
        );
        assert_eq!(
            classifier.classify(&format!("id-preview--{PREVIEW_ID}.lovable.app")),
            expected,
        );
        assert_eq!(classifier.classify(PREVIEW_ID), expected);
        assert_eq!(classifier.classify(&PREVIEW_ID.to_uppercase()), expected);
    }

    #[test]
    fn test_preview_domain_without_uuid_is_unresolvable() {
        let classifier = production();
        assert_eq!(
            classifier.classify("preview--my-site.lovable.app").kind(),
            VerdictKind::Unresolvable,
        );
    }

    #[test]
    fn test_uuid_first_label_on_unknown_domain_is_not_preview() {
        let classifier = production();
        let host = format!("{PREVIEW_ID}.example.com");
        assert_eq!(classifier.classify(&host).kind(), VerdictKind::Unresolvable);
    }

    #[test]
    fn test_legacy_nested_pattern() {
        let classifier = production();
        assert_eq!(
            classifier.classify("acme.churches.church-os.com"),
            HostnameVerdict::candidate("acme", "acme.churches.church-os.com"),
        );
        assert_eq!(
            classifier.classify("acme.chapels.church-os.com").kind(),
            VerdictKind::Unresolvable,
        );
    }

    #[test]
    fn test_development_fallback() {
        assert_eq!(
            production().classify("www.gracechurch.org").kind(),
            VerdictKind::Unresolvable,
        );

        let classifier = development();
        assert_eq!(
            classifier.classify("acme.test"),
            HostnameVerdict::candidate("acme", "acme.test"),
        );
        assert_eq!(
            classifier.classify(&format!("{PREVIEW_ID}.test")).kind(),
            VerdictKind::Unresolvable,
        );
        assert_eq!(
            classifier.classify("intranet").kind(),
            VerdictKind::Unresolvable,
        );
    }

    #[test]
    fn test_garbage_input_is_unresolvable() {
        let classifier = production();
        for input in ["", "   ", "church-os", "com", "...", "https://"] {
            assert_eq!(
                classifier.classify(input).kind(),
                VerdictKind::Unresolvable,
                "input {input:?}",
            );
        }
    }

    #[test]
    fn test_configured_base_domain() {
        let classifier = HostnameClassifier::new(&DomainConfig {
            base_domain: "staging.church-os.dev".to_string(),
            main_domains: vec!["staging.church-os.dev".to_string()],
            ..DomainConfig::default()
        });

        assert_eq!(
            classifier.classify("acme.staging.church-os.dev"),
            HostnameVerdict::candidate("acme", "acme.staging.church-os.dev"),
        );
        assert_eq!(
            classifier.classify("acme.church-os.com").kind(),
            VerdictKind::Unresolvable,
        );
    }
}
