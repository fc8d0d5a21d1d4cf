use crate::validator::TypeTag;
use serde::Serialize;

/// A failed validation: the first violated constraint's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Invalid {
    pub message: String,
}

impl Invalid {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: TypeTag) -> Self {
        Self::new(format!("Invalid type, expected {expected}"))
    }
}

/// The `{ isValid, error }` shape the generated runtimes return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), Invalid>> for Outcome {
    fn from(result: Result<(), Invalid>) -> Self {
        match result {
            Ok(()) => Outcome {
                is_valid: true,
                error: None,
            },
            Err(invalid) => Outcome {
                is_valid: false,
                error: Some(invalid.message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_like_the_generated_runtimes() {
        let outcome = Outcome::from(Err(Invalid::new("Field is required")));
        insta::assert_snapshot!(
            serde_json::to_string(&outcome).unwrap(),
            @r#"{"isValid":false,"error":"Field is required"}"#
        );
        let ok = Outcome::from(Ok(()));
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"isValid":true}"#);
    }
}
