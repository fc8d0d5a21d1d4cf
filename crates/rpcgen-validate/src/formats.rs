//! Fixed string formats.
//!
//! The same patterns are embedded in the generated TypeScript and Go
//! runtimes, so all three agree on what counts as an email, a date-time or
//! a UUID.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Date and time joined by `T`, optional fractional seconds, optional `Z`
/// or `±hh:mm` offset.
pub const ISO8601_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$";

/// RFC 4122 versions 1-5 with the variant nibble in `8..=b`. Matched
/// case-insensitively.
pub const UUID_PATTERN: &str =
    r"^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("static regex"));

static ISO8601: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISO8601_PATTERN).expect("static regex"));

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(UUID_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("static regex")
});

pub fn is_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

pub fn is_iso8601(s: &str) -> bool {
    ISO8601.is_match(s)
}

pub fn is_uuid(s: &str) -> bool {
    UUID.is_match(s)
}

pub fn is_json(s: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(s).is_ok()
}
