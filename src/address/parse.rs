use unicode_normalization::UnicodeNormalization;

use super::types::{Address, FormatError};
use crate::options::ValidationOptions;

impl Address {
    /// Splits `raw` into its parts and applies the display-name and
    /// quoted-local policies of `options`.
    ///
    /// Accepts `Display Name <local@domain>`, `<local@domain>` and bare
    /// `local@domain`. The split point is the last `@`, so a quoted local part
    /// may itself contain `@`.
    pub fn parse(raw: &str, options: &ValidationOptions) -> Result<Self, FormatError> {
        let address = Self::split(raw)?;
        address.check_policy(options)?;
        Ok(address)
    }

    /// Structure only: no option is consulted, a display name or quoted local
    /// part is recorded but never rejected here.
    pub fn split(raw: &str) -> Result<Self, FormatError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(FormatError::invalid());
        }

        let (display_name, addr) = split_display_name(input)?;
        let (local, domain) = addr.rsplit_once('@').ok_or_else(FormatError::invalid)?;

        let is_quoted_local = local.len() >= 2 && local.starts_with('"') && local.ends_with('"');
        let local = if is_quoted_local {
            &local[1..local.len() - 1]
        } else {
            local
        };

        Ok(Self {
            original: raw.to_string(),
            local_part: local.nfc().collect(),
            domain: domain.nfc().collect(),
            display_name,
            is_quoted_local,
        })
    }

    /// Rejects the structural forms `options` does not allow.
    pub fn check_policy(&self, options: &ValidationOptions) -> Result<(), FormatError> {
        if self.display_name.is_some() && !options.allow_display_name {
            return Err(FormatError::new("Display name is not allowed."));
        }
        if self.is_quoted_local && !options.allow_quoted_local {
            return Err(FormatError::new("Quoted local part is not allowed."));
        }
        Ok(())
    }

    /// Same as [`Address::parse`] for input received as raw bytes.
    ///
    /// The bytes are decoded as strict ASCII: any byte above 0x7F is a
    /// [`FormatError`], even when `allow_smtp_utf8` is set.
    pub fn parse_bytes(raw: &[u8], options: &ValidationOptions) -> Result<Self, FormatError> {
        if !raw.is_ascii() {
            return Err(FormatError::new("Address bytes must be ASCII."));
        }
        let text = std::str::from_utf8(raw).map_err(|_| FormatError::invalid())?;
        Self::parse(text, options)
    }
}

/// Domain of `raw` located the same way [`Address::split`] does it, or the
/// trimmed input itself when there is no `@`. Never fails, for the narrow
/// checks that must always answer.
pub(crate) fn domain_part(raw: &str) -> &str {
    let input = raw.trim();
    let addr = split_display_name(input).map_or(input, |(_, addr)| addr);
    addr.rsplit_once('@').map_or(addr, |(_, domain)| domain)
}

/// `Name <addr>` -> (Some(name), addr). A bare `<addr>` yields no name.
fn split_display_name(input: &str) -> Result<(Option<String>, &str), FormatError> {
    if !input.ends_with('>') {
        return Ok((None, input));
    }
    let open = input.rfind('<').ok_or_else(FormatError::invalid)?;
    let addr = input[open + 1..input.len() - 1].trim();
    let name = input[..open].trim();
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
        .trim();

    if addr.is_empty() {
        return Err(FormatError::invalid());
    }
    if name.is_empty() {
        Ok((None, addr))
    } else {
        Ok((Some(name.nfc().collect()), addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn splits_bare_address() {
        let a = Address::parse("  alice@Example.COM ", &opts()).expect("parse");
        assert_eq!(a.local_part, "alice");
        assert_eq!(a.domain, "Example.COM");
        assert_eq!(a.domain_lower(), "example.com");
        assert_eq!(a.display_name, None);
        assert!(!a.is_quoted_local);
        assert_eq!(a.original, "  alice@Example.COM ");
    }

    #[test]
    fn missing_at_is_format_error() {
        let err = Address::parse("alice.example.com", &opts()).expect_err("no @");
        assert_eq!(err.reason(), "Invalid email format.");
        assert!(Address::parse("   ", &opts()).is_err());
    }

    #[test]
    fn splits_on_last_at() {
        let options = ValidationOptions {
            allow_quoted_local: true,
            ..opts()
        };
        let a = Address::parse("\"a@b\"@example.com", &options).expect("parse");
        assert_eq!(a.local_part, "a@b");
        assert_eq!(a.domain, "example.com");
        assert!(a.is_quoted_local);
        assert_eq!(a.addr_spec(), "\"a@b\"@example.com");
    }

    #[test]
    fn quoted_local_rejected_by_default() {
        let err = Address::parse("\"quoted\"@example.com", &opts()).expect_err("quoted");
        assert!(err.reason().contains("Quoted local part"));
    }

    #[test]
    fn display_name_needs_option() {
        let err = Address::parse("Alice <alice@example.com>", &opts()).expect_err("name");
        assert_eq!(err.reason(), "Display name is not allowed.");

        let options = ValidationOptions {
            allow_display_name: true,
            ..opts()
        };
        let a = Address::parse("\"Doe, Alice\" <alice@example.com>", &options).expect("parse");
        assert_eq!(a.display_name.as_deref(), Some("Doe, Alice"));
        assert_eq!(a.local_part, "alice");
    }

    #[test]
    fn bare_angle_brackets_are_accepted() {
        let a = Address::parse("<alice@example.com>", &opts()).expect("parse");
        assert_eq!(a.display_name, None);
        assert_eq!(a.domain, "example.com");
    }

    #[test]
    fn applies_nfc() {
        // "e" + combining acute accent
        let a = Address::parse("cafe\u{301}@example.com", &opts()).expect("parse");
        assert_eq!(a.local_part, "caf\u{e9}");
    }

    #[test]
    fn bytes_must_be_ascii() {
        let a = Address::parse_bytes(b"bob@example.org", &opts()).expect("ascii");
        assert_eq!(a.local_part, "bob");
        let err = Address::parse_bytes("böb@example.org".as_bytes(), &opts()).expect_err("utf8");
        assert!(err.reason().contains("ASCII"));
    }

    #[test]
    fn split_records_forms_without_rejecting() {
        let a = Address::split("Bob <\"x\"@mailinator.com>").expect("split");
        assert_eq!(a.display_name.as_deref(), Some("Bob"));
        assert!(a.is_quoted_local);
        assert_eq!(a.domain, "mailinator.com");
        assert_eq!(
            a.check_policy(&opts()).expect_err("name").reason(),
            "Display name is not allowed."
        );
    }

    #[test]
    fn domain_part_matches_split() {
        for raw in [
            "\"a@b\"@example.com",
            "Name <a@example.com>",
            "  a@example.com ",
            "<a@example.com>",
        ] {
            let split = Address::split(raw).expect(raw);
            assert_eq!(domain_part(raw), split.domain, "{raw}");
        }
        assert_eq!(domain_part("example.com"), "example.com");
        assert_eq!(domain_part("a@mailinator.com."), "mailinator.com.");
    }

    #[test]
    fn domain_literal_is_detected() {
        let a = Address::parse("user@[192.0.2.1]", &opts()).expect("parse");
        assert!(a.is_domain_literal());
    }
}
