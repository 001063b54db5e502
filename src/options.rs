use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-call knobs for [`Validator::validate`](crate::Validator::validate).
///
/// Deserializing a partial JSON object fills the missing fields from
/// [`ValidationOptions::default`], which is how request bodies are merged
/// onto the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    #[serde(rename = "allow_smtputf8")]
    pub allow_smtp_utf8: bool,
    pub allow_empty_local: bool,
    pub allow_quoted_local: bool,
    pub allow_domain_literal: bool,
    pub allow_display_name: bool,
    pub check_deliverability: bool,
    pub test_environment: bool,
    pub globally_deliverable: bool,
    #[serde(rename = "timeout")]
    pub timeout_seconds: u64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            allow_smtp_utf8: false,
            allow_empty_local: false,
            allow_quoted_local: false,
            allow_domain_literal: false,
            allow_display_name: false,
            check_deliverability: true,
            test_environment: false,
            globally_deliverable: true,
            timeout_seconds: 10,
        }
    }
}

impl ValidationOptions {
    /// DNS budget for one deliverability check. Zero falls back to one second
    /// so a lookup is never unbounded.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// True when step 4 of the pipeline has to run.
    pub fn wants_deliverability(&self) -> bool {
        self.check_deliverability && !self.test_environment
    }
}
