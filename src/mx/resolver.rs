use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::error::ProtoErrorKind,
};

use super::cache::MxCache;
use super::{Error, MxRecord, MxStatus};

pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

type LookupResult = Result<Vec<MxRecord>, ResolveError>;

/// Lookup MX records for `domain` using the system resolver.
///
/// "Not found" outcomes (no answer, NXDOMAIN, no nameservers, timeout) come
/// back as [`MxStatus::NoRecords`]; other resolver failures are errors.
/// Records are sorted by ascending preference.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    let name = normalize_domain(domain).ok_or(Error::EmptyDomain)?;
    let lookup = SystemLookup::from_system_conf()?;
    resolve_with(&lookup, &name, DEFAULT_LOOKUP_TIMEOUT)
}

pub(crate) fn resolve_with<R>(
    resolver: &R,
    domain: &str,
    timeout: Duration,
) -> Result<MxStatus, Error>
where
    R: LookupMx + ?Sized,
{
    let mut records = match resolver.lookup_mx(domain, timeout) {
        Ok(records) => records,
        Err(err) if is_not_found(&err) => Vec::new(),
        Err(err) => return Err(Error::lookup(domain, err)),
    };

    records.sort();
    records.dedup();

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

/// Lower-case, trimmed, without the root dot. `None` when nothing is left.
pub(crate) fn normalize_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// The resolver outcomes that mean "this domain takes no mail".
pub(crate) fn is_not_found(err: &ResolveError) -> bool {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. }
        | ResolveErrorKind::NoConnections
        | ResolveErrorKind::Timeout => true,
        ResolveErrorKind::Proto(proto) => matches!(proto.kind(), ProtoErrorKind::Timeout),
        _ => false,
    }
}

/// Source of MX answers. Implementations must give up after `timeout` and
/// report it as [`ResolveErrorKind::Timeout`]; tests plug in stubs.
pub trait LookupMx: Send + Sync {
    fn lookup_mx(&self, domain: &str, timeout: Duration) -> LookupResult;
}

/// Async resolver driven by its own small runtime.
///
/// A query that overruns its budget is dropped, so it holds nothing that a
/// later lookup would wait on. Must not be called from inside another tokio
/// runtime.
pub struct SystemLookup {
    runtime: Runtime,
    resolver: TokioAsyncResolver,
}

impl SystemLookup {
    pub fn from_system_conf() -> Result<Self, Error> {
        let runtime = lookup_runtime()?;
        let resolver = {
            let _guard = runtime.enter();
            TokioAsyncResolver::tokio_from_system_conf().map_err(Error::resolver_init)?
        };
        Ok(Self { runtime, resolver })
    }

    pub fn with_config(config: ResolverConfig, options: ResolverOpts) -> Result<Self, Error> {
        let runtime = lookup_runtime()?;
        let resolver = {
            let _guard = runtime.enter();
            TokioAsyncResolver::tokio(config, options)
        };
        Ok(Self { runtime, resolver })
    }
}

fn lookup_runtime() -> Result<Runtime, Error> {
    Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("mx-lookup")
        .enable_all()
        .build()
        .map_err(Error::runtime_init)
}

impl LookupMx for SystemLookup {
    fn lookup_mx(&self, domain: &str, timeout: Duration) -> LookupResult {
        let answer = self.runtime.block_on(async {
            tokio::time::timeout(timeout, self.resolver.mx_lookup(domain)).await
        });
        let Ok(lookup) = answer else {
            debug!(domain, ?timeout, "MX lookup abandoned after timeout");
            return Err(ResolveErrorKind::Timeout.into());
        };
        let records = lookup?
            .iter()
            .map(|mx| {
                let exchange = normalize_exchange(mx.exchange().to_utf8());
                MxRecord::new(mx.preference(), exchange)
            })
            .collect();
        Ok(records)
    }
}

impl std::fmt::Debug for SystemLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemLookup").finish_non_exhaustive()
    }
}

/// Deliverability checker: "does this domain have MX records", memoised.
///
/// One instance is meant to live for the whole process and be shared by
/// every validation, single or bulk.
pub struct MxResolver {
    lookup: Box<dyn LookupMx>,
    cache: MxCache,
}

impl MxResolver {
    /// System resolver with a cache of `capacity` domains. `ttl = None` keeps
    /// answers for the process lifetime.
    pub fn system(capacity: usize, ttl: Option<Duration>) -> Result<Self, Error> {
        let lookup = SystemLookup::from_system_conf()?;
        Ok(Self::with_lookup(lookup).with_cache(capacity, ttl))
    }

    pub fn with_lookup(lookup: impl LookupMx + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            cache: MxCache::new(DEFAULT_CACHE_CAPACITY, None),
        }
    }

    pub fn with_cache(mut self, capacity: usize, ttl: Option<Duration>) -> Self {
        self.cache = MxCache::new(capacity, ttl);
        self
    }

    /// `Ok(false)` for every "not found" outcome, including a lookup that did
    /// not answer within `timeout`. Unexpected resolver errors are returned
    /// and not cached.
    pub fn has_valid_mx(&self, domain: &str, timeout: Duration) -> Result<bool, Error> {
        let Some(key) = normalize_domain(domain) else {
            return Ok(false);
        };
        if let Some(hit) = self.cache.get(&key) {
            debug!(domain = %key, has_mx = hit, "MX cache hit");
            return Ok(hit);
        }

        let found = match self.lookup.lookup_mx(&key, timeout) {
            Ok(records) => !records.is_empty(),
            Err(err) if is_not_found(&err) => {
                debug!(domain = %key, error = %err, "no usable MX answer");
                false
            }
            Err(err) => return Err(Error::lookup(key, err)),
        };

        debug!(domain = %key, has_mx = found, "MX cache miss resolved");
        self.cache.insert(key, found);
        Ok(found)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for MxResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MxResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str, _timeout: Duration) -> LookupResult {
        (self.on_lookup)(domain)
    }
}
