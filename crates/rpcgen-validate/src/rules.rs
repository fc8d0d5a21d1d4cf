//! Applying declarative schema rules to validators.

use crate::validator::Validator;
use rpcgen_schema::{Rule, RuleKind};
use serde_json::Value;

impl Validator {
    /// Add the constraint a schema rule describes, along with its custom
    /// message. A rule that does not fit this validator's shape (say `email`
    /// on a number) leaves the validator unchanged.
    pub fn with_rule(self, rule: &Rule) -> Self {
        match self.apply(&rule.kind) {
            Ok(applied) => match &rule.message {
                Some(message) => applied.message(message.as_str()),
                None => applied,
            },
            Err(unchanged) => {
                tracing::trace!(rule = rule.kind.name(), "rule does not apply; skipped");
                unchanged
            }
        }
    }

    fn apply(self, kind: &RuleKind) -> Result<Validator, Validator> {
        match (self, kind) {
            (v, RuleKind::Required) => Ok(v.required()),
            (v, RuleKind::Equals { value }) => Ok(v.equals(value.to_json())),
            (v, RuleKind::Enum { value }) => {
                Ok(v.one_of(value.iter().map(|s| s.to_json()).collect::<Vec<Value>>()))
            }
            (Validator::String(s), kind) => {
                let s = match kind {
                    RuleKind::Regex { value } => match regex::Regex::new(value) {
                        Ok(re) => s.regex(re),
                        Err(_) => return Err(Validator::String(s)),
                    },
                    RuleKind::Contains { value } => s.contains(value.as_str()),
                    RuleKind::Length { value } => s.length(*value as usize),
                    RuleKind::MinLength { value } => s.min_length(*value as usize),
                    RuleKind::MaxLength { value } => s.max_length(*value as usize),
                    RuleKind::Email => s.email(),
                    RuleKind::Iso8601 => s.iso8601(),
                    RuleKind::Uuid => s.uuid(),
                    RuleKind::Json => s.json(),
                    RuleKind::Lowercase => s.lowercase(),
                    RuleKind::Uppercase => s.uppercase(),
                    _ => return Err(Validator::String(s)),
                };
                Ok(Validator::String(s))
            }
            (Validator::Number(n), RuleKind::Min { value }) => match value.as_f64() {
                Some(min) => Ok(Validator::Number(n.min(min))),
                None => Err(Validator::Number(n)),
            },
            (Validator::Number(n), RuleKind::Max { value }) => match value.as_f64() {
                Some(max) => Ok(Validator::Number(n.max(max))),
                None => Err(Validator::Number(n)),
            },
            (other, _) => Err(other),
        }
    }
}
