use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{FormatError, INVALID_FORMAT};
use crate::mx::Error as MxError;

pub const EMAIL_VALID: &str = "Email is valid.";
pub const DISPOSABLE_NOT_ALLOWED: &str = "Disposable email addresses are not allowed.";
pub const NO_VALID_MX: &str = "Domain has no valid MX records.";

/// Outcome of one check, serialised as `{"email", "is_valid", "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub email: String,
    pub is_valid: bool,
    pub message: String,
}

impl ValidationVerdict {
    pub fn new(email: impl Into<String>, is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_valid,
            message: message.into(),
        }
    }

    pub fn valid(email: impl Into<String>) -> Self {
        Self::new(email, true, EMAIL_VALID)
    }

    /// Per-item verdict for a classified failure, using the batch wording.
    pub fn rejected(email: impl Into<String>, kind: RejectionKind) -> Self {
        Self::new(email, false, kind.message())
    }
}

/// The three recoverable failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Format,
    Disposable,
    NoMxRecords,
}

impl RejectionKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Format => INVALID_FORMAT,
            Self::Disposable => DISPOSABLE_NOT_ALLOWED,
            Self::NoMxRecords => NO_VALID_MX,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("{}", DISPOSABLE_NOT_ALLOWED)]
    Disposable,
    #[error("{}", NO_VALID_MX)]
    NoMxRecords,
    /// DNS failure outside the "not found" allowlist. Not a verdict.
    #[error(transparent)]
    Resolver(#[from] MxError),
}

impl ValidationError {
    pub(crate) fn format(reason: &'static str) -> Self {
        Self::Format(FormatError::new(reason))
    }

    /// `None` for [`ValidationError::Resolver`].
    pub fn kind(&self) -> Option<RejectionKind> {
        match self {
            Self::Format(_) => Some(RejectionKind::Format),
            Self::Disposable => Some(RejectionKind::Disposable),
            Self::NoMxRecords => Some(RejectionKind::NoMxRecords),
            Self::Resolver(_) => None,
        }
    }
}
