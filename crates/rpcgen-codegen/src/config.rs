//! Generator configuration.
//!
//! Loaded from TOML; every table and key is optional. Example:
//! ```toml
//! [typescript]
//! include_server = false
//!
//! [go]
//! package = "api"
//!
//! [formatter]
//! timeout_ms = 5000
//! on_timeout = "unformatted"
//!
//! [formatter.go]
//! command = ["gofmt"]
//! ```

use crate::error::GenerateError;
use crate::options::GenerateOptions;
use crate::Target;
use serde::Deserialize;
use std::time::Duration;

/// What to do when the formatter does not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnTimeout {
    /// Fail with `FormatterError`, keeping the unformatted text in the error.
    #[default]
    Fail,
    /// Return the unformatted text, marked as not formatted.
    Unformatted,
}

/// An external formatter invocation: program followed by arguments. Source
/// goes in on stdin, formatted source comes out on stdout. Empty disables
/// formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterCommand {
    pub command: Vec<String>,
}

impl FormatterCommand {
    fn of(parts: &[&str]) -> Self {
        Self {
            command: parts.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.command.is_empty()
    }
}

/// Formatter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub timeout_ms: u64,
    pub on_timeout: OnTimeout,
    pub typescript: FormatterCommand,
    pub go: FormatterCommand,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            on_timeout: OnTimeout::Fail,
            typescript: FormatterCommand::of(&["prettier", "--parser", "typescript"]),
            go: FormatterCommand::of(&["gofmt"]),
        }
    }
}

impl FormatterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn command(&self, target: Target) -> &FormatterCommand {
        match target {
            Target::TypeScript => &self.typescript,
            Target::Go => &self.go,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub typescript: GenerateOptions,
    pub go: GenerateOptions,
    pub formatter: FormatterConfig,
}

impl GeneratorConfig {
    /// Parse a TOML document. Unknown keys are ignored.
    pub fn from_toml_str(source: &str) -> Result<Self, GenerateError> {
        Ok(toml::from_str(source)?)
    }

    pub fn options(&self, target: Target) -> &GenerateOptions {
        match target {
            Target::TypeScript => &self.typescript,
            Target::Go => &self.go,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.formatter.command(Target::Go).command, ["gofmt"]);
        assert_eq!(config.formatter.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_tables_merge_with_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [typescript]
            include_server = false
            package = "ignored"
            some_future_flag = true

            [go]
            package = "api"
            omit_client_default_transport = true

            [formatter]
            on_timeout = "unformatted"

            [formatter.typescript]
            command = []
            "#,
        )
        .unwrap();

        assert!(!config.typescript.include_server);
        assert!(config.typescript.include_client);
        assert_eq!(config.go.package_name(), "api");
        assert!(!config.go.default_transport());
        assert_eq!(config.formatter.on_timeout, OnTimeout::Unformatted);
        assert!(config.formatter.command(Target::TypeScript).is_disabled());
        assert_eq!(config.formatter.timeout_ms, 10_000);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = GeneratorConfig::from_toml_str("[formatter\ntimeout_ms = 1").unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));

        let err = GeneratorConfig::from_toml_str("[formatter]\non_timeout = \"retry\"").unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }
}
