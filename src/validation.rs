use regex::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Loose `local@domain.tld` shape check; no whitespace, exactly one `@`, and
/// none of the address-list delimiters `,;<>`.
pub fn is_email(value: &str) -> bool {
    let regex = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@,;<>]+@[^\s@,;<>]+\.[^\s@,;<>]+$").expect("invalid email regex")
    });
    regex.is_match(value)
}
