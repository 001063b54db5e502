//! Batch validation with per-item failure isolation.
//!
//! Every address gets its own verdict; a classified failure on one address
//! never affects the others. The batch is split into contiguous chunks, one
//! per worker thread, and re-assembled in input order.

use thiserror::Error;
use tracing::info;

use crate::mx::Error as MxError;
use crate::options::ValidationOptions;
use crate::validator::{RejectionKind, ValidationError, ValidationVerdict, Validator};

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("Maximum {limit} emails allowed per request, got {got}")]
    TooManyAddresses { limit: usize, got: usize },
    /// An address hit a DNS failure outside the "not found" allowlist.
    #[error("bulk validation aborted: {source}")]
    Resolver {
        email: String,
        #[source]
        source: MxError,
    },
}

impl Validator {
    /// Validates every address of `emails`, returning exactly one verdict per
    /// input, in input order.
    ///
    /// Batches larger than the configured limit are refused before any
    /// address is looked at.
    pub fn validate_many<S>(
        &self,
        emails: &[S],
        options: &ValidationOptions,
    ) -> Result<Vec<ValidationVerdict>, BulkError>
    where
        S: AsRef<str> + Sync,
    {
        if emails.len() > self.bulk_limit {
            return Err(BulkError::TooManyAddresses {
                limit: self.bulk_limit,
                got: emails.len(),
            });
        }
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_len = emails.len().div_ceil(self.bulk_workers.max(1));
        let chunks: Vec<Result<Vec<ValidationVerdict>, BulkError>> = std::thread::scope(|s| {
            let handles: Vec<_> = emails
                .chunks(chunk_len)
                .map(|chunk| s.spawn(move || self.validate_chunk(chunk, options)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut verdicts = Vec::with_capacity(emails.len());
        for chunk in chunks {
            verdicts.extend(chunk?);
        }

        let valid = verdicts.iter().filter(|v| v.is_valid).count();
        info!(total = verdicts.len(), valid, "bulk validation finished");
        Ok(verdicts)
    }

    fn validate_chunk<S: AsRef<str>>(
        &self,
        chunk: &[S],
        options: &ValidationOptions,
    ) -> Result<Vec<ValidationVerdict>, BulkError> {
        chunk
            .iter()
            .map(|email| self.validate_one(email.as_ref(), options))
            .collect()
    }

    fn validate_one(
        &self,
        email: &str,
        options: &ValidationOptions,
    ) -> Result<ValidationVerdict, BulkError> {
        let kind = match self.validate(email, options) {
            Ok(verdict) => return Ok(verdict),
            Err(ValidationError::Format(_)) => RejectionKind::Format,
            Err(ValidationError::Disposable) => RejectionKind::Disposable,
            Err(ValidationError::NoMxRecords) => RejectionKind::NoMxRecords,
            Err(ValidationError::Resolver(source)) => {
                return Err(BulkError::Resolver {
                    email: email.to_string(),
                    source,
                });
            }
        };
        Ok(ValidationVerdict::rejected(email, kind))
    }
}
