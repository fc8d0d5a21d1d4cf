//! Generation failures.

use std::fmt;
use std::time::Duration;

/// Why generation for a target did not produce source text.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("unsupported target language: {0}")]
    UnsupportedTarget(String),

    #[error("invalid Go package name: {0:?}")]
    InvalidPackage(String),

    #[error(transparent)]
    Formatter(#[from] FormatterError),

    #[error("invalid generator configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A concurrent generation task panicked or was cancelled.
    #[error("generation task for {target} failed: {reason}")]
    Task { target: String, reason: String },
}

/// The external formatter failed. The unformatted source is kept so callers
/// can still inspect it.
#[derive(Debug, thiserror::Error)]
#[error("{target} formatter failed: {reason}")]
pub struct FormatterError {
    pub target: String,
    pub reason: FormatFailure,
    pub unformatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatFailure {
    /// The formatter could not be started (usually: not installed).
    Spawn { program: String, message: String },
    /// Piping source in or reading output back failed.
    Io(String),
    /// The formatter ran and exited unsuccessfully.
    Exit { code: Option<i32>, stderr: String },
    /// The formatter printed something that is not UTF-8.
    InvalidOutput,
    TimedOut(Duration),
}

impl fmt::Display for FormatFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatFailure::Spawn { program, message } => {
                write!(f, "could not run `{program}`: {message}")
            }
            FormatFailure::Io(message) => write!(f, "i/o error: {message}"),
            FormatFailure::Exit { code, stderr } => {
                match code {
                    Some(code) => write!(f, "exited with status {code}")?,
                    None => write!(f, "terminated by signal")?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            FormatFailure::InvalidOutput => write!(f, "output is not valid UTF-8"),
            FormatFailure::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatter_errors_render_reason() {
        let err = FormatterError {
            target: "go".into(),
            reason: FormatFailure::Exit {
                code: Some(2),
                stderr: "<standard input>:3:1: expected declaration\n".into(),
            },
            unformatted: "package rpc\n".into(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"go formatter failed: exited with status 2: <standard input>:3:1: expected declaration"
        );
    }

    #[test]
    fn timeouts_render_limit() {
        let reason = FormatFailure::TimedOut(Duration::from_millis(250));
        assert_eq!(reason.to_string(), "timed out after 250ms");
    }
}
