use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// DNS failures that are not one of the "not found" outcomes.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("DNS runtime initialization failed: {source}")]
    RuntimeInit {
        #[source]
        source: std::io::Error,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: ResolveError,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn runtime_init(source: std::io::Error) -> Self {
        Self::RuntimeInit { source }
    }

    pub(crate) fn resolver_init(source: ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(domain: impl Into<String>, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.into(),
            source,
        }
    }
}
