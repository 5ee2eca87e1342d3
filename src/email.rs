use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@<>]+@[^\s@<>.]+(\.[^\s@<>.]+)+$").expect("email pattern is valid")
});

/// Returns `true` for strings shaped like `local@domain.tld`.
///
/// Neither part may contain whitespace, `@` or angle brackets.
pub fn validate_email(candidate: &str) -> bool {
    EMAIL.is_match(candidate)
}
