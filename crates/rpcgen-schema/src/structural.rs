//! Phase 1: grammar checks.
//!
//! The grammar lives in `document.schema.json` and is checked with the
//! `jsonschema` crate, which reports every violation in one pass. Checks
//! that need the parsed field types (rule compatibility) run afterwards on
//! the typed schema and land in the same violation list.

use crate::error::{SchemaError, Violation, Violations};
use crate::model::{Field, FieldMap, RuleKind, Schema};
use serde_json::Value;
use std::sync::LazyLock;

const DOCUMENT_SCHEMA: &str = include_str!("document.schema.json");

static GRAMMAR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(DOCUMENT_SCHEMA).expect("embedded grammar is valid JSON");
    jsonschema::validator_for(&schema).expect("embedded grammar compiles")
});

/// The grammar as a JSON Schema document, for tooling that wants to
/// validate documents on its own.
pub fn document_schema() -> Value {
    serde_json::from_str(DOCUMENT_SCHEMA).expect("embedded grammar is valid JSON")
}

/// Check a raw document against the grammar and return the typed schema.
pub fn check(document: &Value) -> Result<Schema, SchemaError> {
    let violations = check_grammar(document);
    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "grammar violations");
        return Err(SchemaError::Structural(violations));
    }

    let schema = typed(document).map_err(|violation| {
        tracing::debug!(path = %violation.path, "document does not fit the typed model");
        SchemaError::Structural(Violations::from(vec![violation]))
    })?;

    let violations = check_rules(&schema);
    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "rule violations");
        return Err(SchemaError::Structural(violations));
    }
    Ok(schema)
}

/// Read a grammar-valid document into the typed model. Anything the
/// grammar lets through but the model rejects is reported at the pointer
/// where deserialization stopped.
fn typed(document: &Value) -> Result<Schema, Violation> {
    serde_path_to_error::deserialize(document).map_err(|err| {
        let path = pointer(err.path());
        Violation::new(path, err.into_inner().to_string())
    })
}

fn pointer(path: &serde_path_to_error::Path) -> String {
    path.iter()
        .filter_map(|segment| match segment {
            serde_path_to_error::Segment::Seq { index } => Some(format!("/{index}")),
            serde_path_to_error::Segment::Map { key } => Some(format!("/{}", escape_pointer(key))),
            _ => None,
        })
        .collect()
}

/// Every grammar violation in the document.
pub fn check_grammar(document: &Value) -> Violations {
    GRAMMAR
        .iter_errors(document)
        .map(|error| Violation::new(error.instance_path.to_string(), error.to_string()))
        .collect()
}

/// Rule placement checks that the grammar cannot express.
pub fn check_rules(schema: &Schema) -> Violations {
    let mut violations = Violations::default();
    for (i, ty) in schema.types.iter().enumerate() {
        check_field_map(&ty.fields, &format!("/types/{i}/fields"), &mut violations);
    }
    for (i, proc) in schema.procedures.iter().enumerate() {
        let base = format!("/procedures/{i}");
        if let Some(input) = &proc.input {
            check_field_map(input, &format!("{base}/input"), &mut violations);
        }
        if let Some(output) = &proc.output {
            check_field_map(output, &format!("{base}/output"), &mut violations);
        }
    }
    for (i, stream) in schema.streams.iter().enumerate() {
        let base = format!("/streams/{i}");
        if let Some(input) = &stream.input {
            check_field_map(input, &format!("{base}/input"), &mut violations);
        }
        if let Some(output) = &stream.output {
            check_field_map(output, &format!("{base}/output"), &mut violations);
        }
    }
    violations
}

fn check_field_map(fields: &FieldMap, path: &str, violations: &mut Violations) {
    for (name, field) in fields {
        let field_path = format!("{path}/{}", escape_pointer(name));
        check_field(field, &field_path, violations);
    }
}

fn check_field(field: &Field, path: &str, violations: &mut Violations) {
    let ty = field.ty();
    for (j, rule) in field.rules().iter().enumerate() {
        if !rule.kind.applies_to(ty) {
            violations.push(Violation::new(
                format!("{path}/rules/{j}"),
                format!("rule `{}` cannot apply to a field of type `{ty}`", rule.kind.name()),
            ));
        }
        if let RuleKind::Regex { value } = &rule.kind {
            if let Err(e) = regex::Regex::new(value) {
                violations.push(Violation::new(
                    format!("{path}/rules/{j}/value"),
                    format!("invalid regular expression: {e}"),
                ));
            }
        }
        if field.is_optional() && rule.kind == RuleKind::Required {
            violations.push(Violation::new(
                format!("{path}/rules/{j}"),
                "an optional field cannot carry a `required` rule",
            ));
        }
    }
    if let Some(nested) = field.fields() {
        check_field_map(nested, &format!("{path}/fields"), violations);
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
