use std::borrow::Cow;

use thiserror::Error;

pub const INVALID_FORMAT: &str = "Invalid email format.";

/// Structural parts of an address, produced by [`Address::parse`](super::Address::parse).
///
/// `local_part` and `domain` are NFC-normalised. The domain keeps the casing
/// the caller used; compare through [`Address::domain_lower`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub original: String,
    pub local_part: String,
    pub domain: String,
    pub display_name: Option<String>,
    pub is_quoted_local: bool,
}

impl Address {
    pub fn domain_lower(&self) -> String {
        self.domain.to_lowercase()
    }

    /// Rebuilds `local@domain`, re-quoting the local part when it was quoted.
    pub fn addr_spec(&self) -> String {
        if self.is_quoted_local {
            format!("\"{}\"@{}", self.local_part, self.domain)
        } else {
            format!("{}@{}", self.local_part, self.domain)
        }
    }

    /// `true` for `[...]` domains.
    pub fn is_domain_literal(&self) -> bool {
        self.domain.starts_with('[') && self.domain.ends_with(']')
    }
}

/// The address has no recognisable structure, or uses a form the options forbid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct FormatError {
    reason: Cow<'static, str>,
}

impl FormatError {
    pub(crate) fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid() -> Self {
        Self::new(INVALID_FORMAT)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
