//! Phase 2: cross-reference checks.
//!
//! Custom types are resolved purely by membership in the set of declared
//! names. Nothing is expanded, so types that reference each other (or
//! themselves) resolve like any other reference.

use crate::error::{SchemaError, SemanticIssue, SemanticIssues};
use crate::model::{FieldMap, Schema};
use std::collections::HashSet;

/// Run the semantic checks on a structurally valid schema.
pub fn check(schema: &Schema) -> Result<(), SchemaError> {
    if let Some(duplicate) = first_duplicate(schema) {
        return Err(SchemaError::Semantic(SemanticIssues::from(vec![duplicate])));
    }

    let issues = unresolved_references(schema);
    if issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = issues.len(), "unresolved type references");
        Err(SchemaError::Semantic(issues))
    }
}

/// First repeated declaration name, in declaration order.
///
/// Types are checked against each other; procedures and streams share a
/// separate namespace because they become dispatch keys.
pub fn first_duplicate(schema: &Schema) -> Option<SemanticIssue> {
    let mut types = HashSet::new();
    for ty in &schema.types {
        if !types.insert(ty.name.as_str()) {
            return Some(SemanticIssue::DuplicateType {
                name: ty.name.clone(),
            });
        }
    }

    let mut operations = HashSet::new();
    let names = schema
        .procedures
        .iter()
        .map(|p| p.name.as_str())
        .chain(schema.streams.iter().map(|s| s.name.as_str()));
    for name in names {
        if !operations.insert(name) {
            return Some(SemanticIssue::DuplicateProcedure {
                name: name.to_string(),
            });
        }
    }
    None
}

/// Every custom type reference that names no declared type.
pub fn unresolved_references(schema: &Schema) -> SemanticIssues {
    let declared: HashSet<&str> = schema.types.iter().map(|t| t.name.as_str()).collect();
    let mut resolver = Resolver {
        declared,
        issues: SemanticIssues::default(),
    };

    for ty in &schema.types {
        resolver.walk(&ty.fields, &format!("type:{}:fields", ty.name));
    }
    for proc in &schema.procedures {
        if let Some(input) = &proc.input {
            resolver.walk(input, &format!("procedure:{}:input", proc.name));
        }
        if let Some(output) = &proc.output {
            resolver.walk(output, &format!("procedure:{}:output", proc.name));
        }
    }
    for stream in &schema.streams {
        if let Some(input) = &stream.input {
            resolver.walk(input, &format!("stream:{}:input", stream.name));
        }
        if let Some(output) = &stream.output {
            resolver.walk(output, &format!("stream:{}:output", stream.name));
        }
    }
    resolver.issues
}

struct Resolver<'a> {
    declared: HashSet<&'a str>,
    issues: SemanticIssues,
}

impl Resolver<'_> {
    fn walk(&mut self, fields: &FieldMap, path: &str) {
        for (name, field) in fields {
            let field_path = format!("{path}.{name}");
            if let Some(custom) = field.ty().custom_name() {
                if !self.declared.contains(custom) {
                    self.issues.push(SemanticIssue::UnresolvedReference {
                        name: custom.to_string(),
                        path: field_path.clone(),
                    });
                }
            }
            if let Some(nested) = field.fields() {
                self.walk(nested, &field_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn detects_duplicate_types_in_declaration_order() {
        let s = schema(json!({
            "types": [
                { "name": "User", "fields": { "id": "string" } },
                { "name": "Post", "fields": { "id": "string" } },
                { "name": "Post", "fields": { "id": "string" } },
                { "name": "User", "fields": { "id": "string" } }
            ],
            "procedures": [{ "name": "Ping", "kind": "query" }]
        }));
        assert_eq!(
            first_duplicate(&s),
            Some(SemanticIssue::DuplicateType {
                name: "Post".into()
            })
        );
    }

    #[test]
    fn procedures_and_streams_share_a_namespace() {
        let s = schema(json!({
            "procedures": [{ "name": "Events", "kind": "query" }],
            "streams": [{ "name": "Events" }]
        }));
        assert_eq!(
            first_duplicate(&s),
            Some(SemanticIssue::DuplicateProcedure {
                name: "Events".into()
            })
        );
    }

    #[test]
    fn collects_all_unresolved_references() {
        let s = schema(json!({
            "types": [
                { "name": "User", "fields": {
                    "pet": "Pet",
                    "address": { "type": "object", "fields": { "country": "Country[]" } }
                } }
            ],
            "procedures": [
                { "name": "GetUser", "kind": "query", "output": { "user": "User", "ghost": "Ghost" } }
            ]
        }));
        let issues: Vec<_> = unresolved_references(&s).into_inner();
        assert_eq!(
            issues,
            vec![
                SemanticIssue::UnresolvedReference {
                    name: "Pet".into(),
                    path: "type:User:fields.pet".into(),
                },
                SemanticIssue::UnresolvedReference {
                    name: "Country".into(),
                    path: "type:User:fields.address.country".into(),
                },
                SemanticIssue::UnresolvedReference {
                    name: "Ghost".into(),
                    path: "procedure:GetUser:output.ghost".into(),
                },
            ]
        );
    }

    #[test]
    fn self_references_resolve() {
        let s = schema(json!({
            "types": [
                { "name": "Node", "fields": { "children": "Node[]", "parent": { "type": "Node", "optional": true } } }
            ],
            "procedures": [{ "name": "Ping", "kind": "query" }]
        }));
        assert!(check(&s).is_ok());
    }
}
