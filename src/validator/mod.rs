mod domain;
mod local;
mod types;

pub use types::{
    DISPOSABLE_NOT_ALLOWED, EMAIL_VALID, NO_VALID_MX, RejectionKind, ValidationError,
    ValidationVerdict,
};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::address::{Address, INVALID_FORMAT, domain_part};
use crate::config::EngineConfig;
use crate::disposable::{DisposableDomains, DomainListSource, HttpListSource, StaticListSource};
use crate::mx::{Error as MxError, MxResolver};
use crate::options::ValidationOptions;

use domain::{DomainKind, classify_domain, is_public_domain};
use local::is_local_valid;

/// The validation pipeline. Holds the two process-wide caches; clone the
/// `Arc`s (or the validator itself) to share them.
///
/// Check order is fixed: disposable, syntax, domain literal, deliverability.
#[derive(Debug, Clone)]
pub struct Validator {
    disposable: Arc<DisposableDomains>,
    mx: Arc<MxResolver>,
    pub(crate) bulk_limit: usize,
    pub(crate) bulk_workers: usize,
}

impl Validator {
    pub fn new(disposable: Arc<DisposableDomains>, mx: Arc<MxResolver>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            disposable,
            mx,
            bulk_limit: defaults.bulk_limit,
            bulk_workers: defaults.bulk_workers,
        }
    }

    /// Remote disposable list and system resolver, both configured from
    /// `config`. Nothing is fetched until the first classification.
    pub fn from_config(config: &EngineConfig) -> Result<Self, MxError> {
        let source = HttpListSource::new(&config.disposable_url, config.disposable_timeout);
        let disposable = match source {
            Ok(source) => Self::cache_for(source, config),
            Err(err) => {
                // no HTTP client, no list: nothing is ever classified disposable
                warn!(error = %err, "disposable list source unavailable");
                Self::cache_for(StaticListSource::default(), config)
            }
        };
        Self::with_source(disposable, config)
    }

    /// Like [`Validator::from_config`] with a caller-chosen list source.
    pub fn from_config_with_source(
        source: impl DomainListSource + 'static,
        config: &EngineConfig,
    ) -> Result<Self, MxError> {
        Self::with_source(Self::cache_for(source, config), config)
    }

    fn cache_for(
        source: impl DomainListSource + 'static,
        config: &EngineConfig,
    ) -> DisposableDomains {
        DisposableDomains::new(source).with_retry_interval(config.disposable_retry_interval)
    }

    fn with_source(disposable: DisposableDomains, config: &EngineConfig) -> Result<Self, MxError> {
        let mx = MxResolver::system(config.mx_cache_capacity, config.mx_cache_ttl)?;
        Ok(Self::new(Arc::new(disposable), Arc::new(mx))
            .with_bulk_limits(config.bulk_limit, config.bulk_workers))
    }

    /// Upper bound on one batch and number of worker threads used for it.
    pub fn with_bulk_limits(mut self, limit: usize, workers: usize) -> Self {
        self.bulk_limit = limit;
        self.bulk_workers = workers.max(1);
        self
    }

    pub fn disposable_domains(&self) -> &Arc<DisposableDomains> {
        &self.disposable
    }

    pub fn mx_resolver(&self) -> &Arc<MxResolver> {
        &self.mx
    }

    /// Re-fetches the disposable list, see [`DisposableDomains::refresh`].
    pub fn refresh_disposable(&self) {
        self.disposable.refresh();
    }

    /// Full pipeline. Each failure kind is a distinct [`ValidationError`]
    /// variant; [`ValidationError::Resolver`] signals an unexpected DNS error.
    pub fn validate(
        &self,
        email: &str,
        options: &ValidationOptions,
    ) -> Result<ValidationVerdict, ValidationError> {
        let address = Address::split(email)?;

        // 1. disposable, before any syntax or policy check
        if self.disposable.is_disposable(&address.domain) {
            debug!(email, "rejected: disposable domain");
            return Err(ValidationError::Disposable);
        }

        // 2. syntax
        address.check_policy(options)?;
        if !is_local_valid(&address.local_part, address.is_quoted_local, options) {
            return Err(ValidationError::format(INVALID_FORMAT));
        }
        let kind = classify_domain(&address.domain)
            .ok_or_else(|| ValidationError::format(INVALID_FORMAT))?;

        // 3. domain literal policy
        if kind == DomainKind::Literal && !options.allow_domain_literal {
            return Err(ValidationError::format("Domain literal is not allowed."));
        }

        // 4. deliverability; literals have nothing to look up
        if options.wants_deliverability() && kind == DomainKind::Hostname {
            if !self.is_globally_deliverable(&address.domain, options) {
                debug!(email, "rejected: reserved top-level domain");
                return Err(ValidationError::NoMxRecords);
            }
            if !self.mx.has_valid_mx(&address.domain, options.timeout())? {
                debug!(email, "rejected: no MX records");
                return Err(ValidationError::NoMxRecords);
            }
        }

        Ok(ValidationVerdict::valid(email))
    }

    /// Disposable check alone. Never fails.
    pub fn check_disposable(&self, email: &str) -> ValidationVerdict {
        let disposable = self.disposable.is_disposable(domain_part(email));
        let message = if disposable {
            "Domain is disposable."
        } else {
            "Domain is not disposable."
        };
        ValidationVerdict::new(email, !disposable, message)
    }

    /// MX check alone. Never fails: an unexpected resolver error is logged and
    /// reported as "no valid MX records".
    pub fn check_mx(&self, email: &str, options: &ValidationOptions) -> ValidationVerdict {
        let has_mx = match self.mx.has_valid_mx(domain_part(email), options.timeout()) {
            Ok(found) => found,
            Err(err) => {
                warn!(email, error = %err, "MX check failed");
                false
            }
        };
        let message = if has_mx {
            "Valid MX records found."
        } else {
            "No valid MX records."
        };
        ValidationVerdict::new(email, has_mx, message)
    }

    /// `false` for domains under a reserved top-level label, without any DNS
    /// traffic. Always `true` when `globally_deliverable` is off.
    pub fn is_globally_deliverable(
        &self,
        email_or_domain: &str,
        options: &ValidationOptions,
    ) -> bool {
        !options.globally_deliverable || is_public_domain(domain_part(email_or_domain))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mx::tests::StubResolver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trust_dns_resolver::error::ResolveErrorKind;

    pub(crate) fn validator_with(with_mx: &[&str]) -> (Validator, Arc<AtomicUsize>) {
        let disposable = DisposableDomains::new(StaticListSource::new([
            "mailinator.com",
            "yopmail.com",
        ]));
        let (stub, calls) = StubResolver::counting(with_mx);
        let mx = MxResolver::with_lookup(stub);
        let validator = Validator::new(Arc::new(disposable), Arc::new(mx));
        (validator, calls)
    }

    fn validator() -> Validator {
        validator_with(&["example.com", "yahoo.co.id", "sub.domain.com", "gmail.com"]).0
    }

    fn opts() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn accepts_valid_addresses() {
        let v = validator();
        for email in [
            "test@example.com",
            "fathin+waiting@yahoo.co.id",
            "user@sub.domain.com",
        ] {
            let verdict = v.validate(email, &opts()).expect(email);
            assert!(verdict.is_valid);
            assert_eq!(verdict.email, email);
            assert_eq!(verdict.message, "Email is valid.");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        let v = validator();
        for email in [
            "@invalid-email.com",
            "@missinglocalpart.com",
            "no-at-sign.com",
            "a b@example.com",
        ] {
            let err = v.validate(email, &opts()).expect_err(email);
            assert!(matches!(err, ValidationError::Format(_)), "{email}: {err:?}");
        }
    }

    #[test]
    fn disposable_precedes_syntax() {
        let v = validator();
        let err = v
            .validate("not valid!!@mailinator.com", &opts())
            .expect_err("disposable");
        assert!(matches!(err, ValidationError::Disposable));
        let err = v.validate("x@MAILINATOR.com", &opts()).expect_err("disposable");
        assert!(matches!(err, ValidationError::Disposable));
    }

    #[test]
    fn quoted_local_follows_option() {
        let v = validator();
        let err = v
            .validate("\"quoted\"@example.com", &opts())
            .expect_err("quoted not allowed");
        assert!(matches!(err, ValidationError::Format(_)));
        assert!(err.to_string().contains("Quoted local part"));

        let options = ValidationOptions {
            allow_quoted_local: true,
            ..opts()
        };
        let verdict = v
            .validate("\"quoted\"@example.com", &options)
            .expect("quoted allowed");
        assert!(verdict.is_valid);
    }

    #[test]
    fn domain_literal_follows_option() {
        let v = validator();
        let err = v.validate("user@[192.0.2.1]", &opts()).expect_err("literal");
        assert_eq!(err.to_string(), "Domain literal is not allowed.");

        let options = ValidationOptions {
            allow_domain_literal: true,
            ..opts()
        };
        let verdict = v.validate("user@[192.0.2.1]", &options).expect("literal ok");
        assert!(verdict.is_valid);
    }

    #[test]
    fn missing_mx_is_its_own_error() {
        let v = validator();
        let err = v.validate("test@invalid-domain.xyz", &opts()).expect_err("no mx");
        assert!(matches!(err, ValidationError::NoMxRecords));
        assert_eq!(err.to_string(), "Domain has no valid MX records.");
    }

    #[test]
    fn deliverability_can_be_skipped() {
        let (v, calls) = validator_with(&[]);
        let skip = ValidationOptions {
            check_deliverability: false,
            ..opts()
        };
        let verdict = v.validate("test@invalid-domain.xyz", &skip).expect("skip");
        assert!(verdict.is_valid);
        let test_env = ValidationOptions {
            test_environment: true,
            ..opts()
        };
        let verdict = v
            .validate("test@invalid-domain.xyz", &test_env)
            .expect("test env");
        assert!(verdict.is_valid);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reserved_tld_fails_without_dns() {
        let (v, calls) = validator_with(&["printer.example"]);
        let err = v.validate("a@printer.example", &opts()).expect_err("reserved");
        assert!(matches!(err, ValidationError::NoMxRecords));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let options = ValidationOptions {
            globally_deliverable: false,
            ..opts()
        };
        let verdict = v.validate("a@printer.example", &options).expect("mx lookup");
        assert!(verdict.is_valid);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn globally_deliverable_check() {
        let v = validator();
        assert!(v.is_globally_deliverable("test@example.com", &opts()));
        assert!(!v.is_globally_deliverable("test@local", &opts()));
        assert!(!v.is_globally_deliverable("test@invalid", &opts()));
        let off = ValidationOptions {
            globally_deliverable: false,
            ..opts()
        };
        assert!(v.is_globally_deliverable("test@invalid", &off));
    }

    #[test]
    fn unexpected_dns_error_propagates() {
        let disposable = DisposableDomains::new(StaticListSource::default());
        let mx = MxResolver::with_lookup(StubResolver::new(|_| {
            Err(ResolveErrorKind::Message("refused").into())
        }));
        let v = Validator::new(Arc::new(disposable), Arc::new(mx));
        let err = v.validate("a@example.com", &opts()).expect_err("fatal");
        assert!(matches!(err, ValidationError::Resolver(_)));
        assert_eq!(err.kind(), None);

        let verdict = v.check_mx("a@example.com", &opts());
        assert!(!verdict.is_valid);
    }

    #[test]
    fn check_disposable_messages() {
        let v = validator();
        let verdict = v.check_disposable("test@mailinator.com");
        assert!(!verdict.is_valid);
        assert!(verdict.message.contains("disposable"));

        let verdict = v.check_disposable("test@gmail.com");
        assert!(verdict.is_valid);
        assert!(verdict.message.contains("not disposable"));
    }

    #[test]
    fn check_mx_messages() {
        let v = validator();
        let verdict = v.check_mx("test@gmail.com", &opts());
        assert!(verdict.is_valid);
        assert!(verdict.message.contains("Valid MX records found"));

        let verdict = v.check_mx("test@invalid-domain.xyz", &opts());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "No valid MX records.");
    }

    #[test]
    fn narrow_checks_are_cache_stable() {
        let (v, calls) = validator_with(&["gmail.com"]);
        let first = v.check_mx("a@gmail.com", &opts());
        let second = v.check_mx("a@gmail.com", &opts());
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            v.check_disposable("a@yopmail.com"),
            v.check_disposable("a@yopmail.com")
        );
    }

    #[test]
    fn disposable_precedes_structural_policies() {
        let v = validator();
        for email in ["\"x\"@mailinator.com", "Bob <a@mailinator.com>"] {
            let err = v.validate(email, &opts()).expect_err(email);
            assert!(matches!(err, ValidationError::Disposable), "{email}: {err:?}");
        }
        let err = v
            .validate("Bob <a@example.com>", &opts())
            .expect_err("display name");
        assert_eq!(err.to_string(), "Display name is not allowed.");
    }

    #[test]
    fn trailing_root_dot_is_still_disposable() {
        let v = validator();
        let verdict = v.check_disposable("a@mailinator.com.");
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "Domain is disposable.");
        let err = v.validate("a@mailinator.com.", &opts()).expect_err("disposable");
        assert!(matches!(err, ValidationError::Disposable));
    }

    #[test]
    fn narrow_checks_use_parser_split() {
        let v = validator();
        assert!(!v.check_disposable("Bob <a@mailinator.com>").is_valid);
        assert!(!v.check_disposable("\"a@b\"@yopmail.com").is_valid);
        assert!(v.check_mx("  Bob <a@gmail.com> ", &opts()).is_valid);
    }
}
