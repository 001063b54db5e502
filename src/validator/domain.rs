use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use phf::phf_set;
use regex::Regex;

static HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex"));

/// Top-level labels that never route on the public internet.
static NON_PUBLIC_TLDS: phf::Set<&'static str> = phf_set! {
    "local",
    "example",
    "invalid",
    "test",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DomainKind {
    Hostname,
    Literal,
}

/// Classifies a syntactically acceptable domain, `None` otherwise.
pub(crate) fn classify_domain(domain: &str) -> Option<DomainKind> {
    if let Some(inner) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        return is_address_literal(inner).then_some(DomainKind::Literal);
    }
    HOSTNAME.is_match(domain).then_some(DomainKind::Hostname)
}

/// `192.0.2.1` or `IPv6:2001:db8::1`.
fn is_address_literal(inner: &str) -> bool {
    if let Some(v6) = inner.strip_prefix("IPv6:") {
        return v6.parse::<Ipv6Addr>().is_ok();
    }
    inner.parse::<Ipv4Addr>().is_ok()
}

/// `false` when the last label is reserved (`local`, `example`, `invalid`,
/// `test`).
pub(crate) fn is_public_domain(domain: &str) -> bool {
    let tld = domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    !NON_PUBLIC_TLDS.contains(tld.as_str())
}
