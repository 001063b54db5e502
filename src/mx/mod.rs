//! MX lookups with a shared, bounded result cache.
//!
//! [`MxResolver::has_valid_mx`] is what the validator uses: it answers
//! `true`/`false` and memoises the answer per domain. [`check_mx`] is a
//! one-shot diagnostic returning the records themselves.

mod cache;
mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_LOOKUP_TIMEOUT, LookupMx, MxResolver, SystemLookup, check_mx,
};
pub use types::{MxRecord, MxStatus};
