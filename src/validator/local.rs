use std::sync::LazyLock;

use regex::Regex;

use crate::options::ValidationOptions;

static BARE_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+$").expect("valid regex"));

// SMTPUTF8: any non-ASCII character is accepted next to the ASCII set
static BARE_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z0-9._%+-]|[^\x00-\x7F])+$").expect("valid regex"));

// content between the quotes: no bare '"', backslash escapes anything
static QUOTED_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:[^"\\]|\\.)*$"#).expect("valid regex"));

/// Syntax rule for the local part, after quote stripping.
pub(crate) fn is_local_valid(local: &str, quoted: bool, options: &ValidationOptions) -> bool {
    if local.is_empty() {
        return options.allow_empty_local;
    }
    if quoted {
        return QUOTED_CONTENT.is_match(local);
    }
    if options.allow_smtp_utf8 {
        BARE_UTF8.is_match(local)
    } else {
        BARE_ASCII.is_match(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn bare_charset() {
        assert!(is_local_valid("fathin+waiting", false, &opts()));
        assert!(is_local_valid("first.last_%-", false, &opts()));
        assert!(!is_local_valid("a b", false, &opts()));
        assert!(!is_local_valid("a!b", false, &opts()));
    }

    #[test]
    fn empty_needs_option() {
        assert!(!is_local_valid("", false, &opts()));
        let options = ValidationOptions {
            allow_empty_local: true,
            ..opts()
        };
        assert!(is_local_valid("", false, &options));
        assert!(is_local_valid("", true, &options));
    }

    #[test]
    fn quoted_content() {
        assert!(is_local_valid("a b", true, &opts()));
        assert!(is_local_valid(r#"a\"b"#, true, &opts()));
        assert!(is_local_valid("a@b", true, &opts()));
        assert!(!is_local_valid(r#"a"b"#, true, &opts()));
    }

    #[test]
    fn smtputf8_allows_non_ascii() {
        assert!(!is_local_valid("josé", false, &opts()));
        let options = ValidationOptions {
            allow_smtp_utf8: true,
            ..opts()
        };
        assert!(is_local_valid("josé", false, &options));
        assert!(!is_local_valid("jo sé", false, &options));
    }
}
