//! Generation followed by external formatting.

use crate::config::{GeneratorConfig, OnTimeout};
use crate::error::{FormatFailure, FormatterError, GenerateError};
use crate::format::Formatter;
use crate::{Target, generate};
use rpcgen_schema::Schema;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Source text for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub target: Target,
    pub source: String,
    /// False when no formatter is configured, or when the formatter timed
    /// out under [`OnTimeout::Unformatted`].
    pub formatted: bool,
}

/// Generate source for `target` and run the configured formatter over it.
///
/// A formatter timeout fails with [`FormatFailure::TimedOut`] (unformatted
/// text kept in the error) unless the configuration asks for the
/// unformatted text instead.
pub async fn generate_formatted(
    schema: &Schema,
    target: Target,
    config: &GeneratorConfig,
) -> Result<Generated, GenerateError> {
    let source = generate(schema, target, config.options(target))?;
    let Some(formatter) =
        Formatter::new(config.formatter.command(target), config.formatter.timeout())
    else {
        tracing::debug!(language = target.name(), "formatting disabled");
        return Ok(Generated {
            target,
            source,
            formatted: false,
        });
    };

    match formatter.run(&source).await {
        Ok(formatted) => Ok(Generated {
            target,
            source: formatted,
            formatted: true,
        }),
        Err(FormatFailure::TimedOut(_)) if config.formatter.on_timeout == OnTimeout::Unformatted => {
            tracing::warn!(
                language = target.name(),
                program = formatter.program(),
                "returning unformatted source"
            );
            Ok(Generated {
                target,
                source,
                formatted: false,
            })
        }
        Err(reason) => Err(FormatterError {
            target: target.name().to_string(),
            reason,
            unformatted: source,
        }
        .into()),
    }
}

/// Generate every target concurrently. Targets share nothing; each result
/// stands alone and results come back in the order of `targets`.
pub async fn generate_all(
    schema: Arc<Schema>,
    targets: &[Target],
    config: Arc<GeneratorConfig>,
) -> Vec<Result<Generated, GenerateError>> {
    let mut set = JoinSet::new();
    for (index, &target) in targets.iter().enumerate() {
        let schema = Arc::clone(&schema);
        let config = Arc::clone(&config);
        set.spawn(async move { (index, generate_formatted(&schema, target, &config).await) });
    }

    let mut results: Vec<Option<Result<Generated, GenerateError>>> =
        targets.iter().map(|_| None).collect();
    let mut failure = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "generation task failed");
                failure = Some(e.to_string());
            }
        }
    }

    results
        .into_iter()
        .zip(targets)
        .map(|(result, target)| {
            result.unwrap_or_else(|| {
                Err(GenerateError::Task {
                    target: target.name().to_string(),
                    reason: failure.clone().unwrap_or_else(|| "task did not finish".into()),
                })
            })
        })
        .collect()
}
