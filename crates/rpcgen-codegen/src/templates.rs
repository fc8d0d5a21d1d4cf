//! Fixed runtime code embedded into generated units.

use crate::ir::Runtime;

pub mod typescript {
    use super::Runtime;

    pub const CORE: &str = include_str!("templates/typescript/core.ts.tmpl");
    pub const VALIDATION: &str = include_str!("templates/typescript/validation.ts.tmpl");
    pub const SERVER: &str = include_str!("templates/typescript/server.ts.tmpl");
    pub const CLIENT: &str = include_str!("templates/typescript/client.ts.tmpl");
    pub const TRANSPORT: &str = include_str!("templates/typescript/transport.ts.tmpl");

    pub fn runtime(runtime: Runtime) -> &'static str {
        match runtime {
            Runtime::Core => CORE,
            Runtime::Validation => VALIDATION,
            Runtime::Server => SERVER,
            Runtime::Client => CLIENT,
            Runtime::DefaultTransport => TRANSPORT,
        }
    }
}

pub mod go {
    use super::Runtime;

    pub const CORE: &str = include_str!("templates/go/core.go.tmpl");
    pub const VALIDATION: &str = include_str!("templates/go/validation.go.tmpl");
    pub const SERVER: &str = include_str!("templates/go/server.go.tmpl");
    pub const CLIENT: &str = include_str!("templates/go/client.go.tmpl");
    pub const TRANSPORT: &str = include_str!("templates/go/transport.go.tmpl");

    pub fn runtime(runtime: Runtime) -> &'static str {
        match runtime {
            Runtime::Core => CORE,
            Runtime::Validation => VALIDATION,
            Runtime::Server => SERVER,
            Runtime::Client => CLIENT,
            Runtime::DefaultTransport => TRANSPORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcgen_validate::formats::{EMAIL_PATTERN, ISO8601_PATTERN, UUID_PATTERN};

    #[test]
    fn runtime_patterns_match_the_rust_validators() {
        for pattern in [EMAIL_PATTERN, ISO8601_PATTERN] {
            assert!(typescript::VALIDATION.contains(&format!("/{pattern}/")));
            assert!(go::VALIDATION.contains(&format!("`{pattern}`")));
        }
        assert!(typescript::VALIDATION.contains(&format!("/{UUID_PATTERN}/i")));
        assert!(go::VALIDATION.contains(&format!("`(?i){UUID_PATTERN}`")));
    }

    #[test]
    fn runtime_messages_match_the_rust_validators() {
        for message in [
            "Field is required",
            "Invalid type, expected ",
            "String does not match the required pattern",
            "Invalid ISO 8601 date-time format",
            "Value exceeds the maximum of ",
            "Referenced schema is not defined",
        ] {
            assert!(typescript::VALIDATION.contains(message), "{message}");
            assert!(go::VALIDATION.contains(message), "{message}");
        }
    }

    /// Position of each needle in `source`, failing if one is missing.
    fn positions(source: &str, needles: &[&str]) -> Vec<usize> {
        needles
            .iter()
            .map(|needle| source.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
            .collect()
    }

    fn assert_ascending(positions: &[usize]) {
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn lazy_references_check_presence_before_resolving() {
        // Presence, then equals/enum, then the referenced validator.
        assert_ascending(&positions(
            typescript::VALIDATION,
            &[
                "if (value === undefined || value === null) {",
                "if (spec.tag === \"lazy\") {",
                "const failed = membership(find, value);",
                "const target = spec.resolve?.();",
                "if (!typeMatches(spec.tag, value)) {",
            ],
        ));
        assert_ascending(&positions(
            go::VALIDATION,
            &[
                "func (v Validator) Validate(value any) string {\n\tif value == nil {",
                "if v.tag == tagLazy {",
                "if failed := v.membership(value); failed != \"\" {",
                "target, ok := v.resolve()",
                "if !hasType(v.tag, value) {",
            ],
        ));
    }
}
