//! End-to-end behavior of document validation.

use rpcgen_schema::{
    FieldType, Primitive, SchemaError, SemanticIssue, TypeClass, classify, parse_array,
    parse_document, validate_document,
};
use serde_json::json;

#[test]
fn round_trip_preserves_structure_and_order() {
    let source = r#"{
        "types": [
            {
                "name": "User",
                "desc": "A registered user",
                "fields": {
                    "zeta": "string",
                    "alpha": {
                        "type": "int",
                        "desc": "age in years",
                        "optional": true,
                        "rules": [
                            { "rule": "min", "value": 0 },
                            { "rule": "max", "value": 150, "message": "too old" }
                        ]
                    },
                    "address": {
                        "type": "object",
                        "fields": { "street": "string", "lines": "string[][]" }
                    }
                }
            }
        ],
        "procedures": [
            {
                "name": "GetUser",
                "kind": "query",
                "input": { "id": { "type": "string", "rules": [{ "rule": "uuid" }] } },
                "output": { "user": "User" },
                "meta": { "auth": true, "cost": 2.5, "scope": "read" }
            },
            { "name": "Ping", "kind": "mutation" }
        ]
    }"#;

    let document: serde_json::Value = serde_json::from_str(source).unwrap();
    let schema = validate_document(&document).unwrap();
    let back = serde_json::to_value(&schema).unwrap();

    assert_eq!(back.to_string(), document.to_string());
    let keys: Vec<_> = schema.types[0].fields.keys().cloned().collect();
    assert_eq!(keys, ["zeta", "alpha", "address"]);
}

#[test]
fn malformed_text_is_a_parsing_error() {
    let err = parse_document("{ \"procedures\": [").unwrap_err();
    assert!(matches!(err, SchemaError::Parsing(_)));
}

#[test]
fn structural_errors_are_listed_together() {
    let err = validate_document(&json!({
        "types": [{ "name": "lower", "fields": {} }],
        "procedures": [{ "name": "Ping", "kind": "query", "surprise": 1 }]
    }))
    .unwrap_err();

    let violations = err.violations().expect("structural failure");
    assert!(violations.any_at("/types/0/name"));
    assert!(violations.any_at("/types/0/fields"));
    assert!(violations.any_at("/procedures/0"));
}

#[test]
fn duplicate_type_names_fail_semantically() {
    for position in 0..3 {
        let mut types = vec![
            json!({ "name": "Post", "fields": { "id": "string" } }),
            json!({ "name": "Tag", "fields": { "id": "string" } }),
        ];
        types.insert(position, json!({ "name": "User", "fields": { "id": "string" } }));
        types.push(json!({ "name": "User", "fields": { "name": "string" } }));

        let err = validate_document(&json!({
            "types": types,
            "procedures": [{ "name": "Ping", "kind": "query" }]
        }))
        .unwrap_err();

        let issues = err.semantic_issues().expect("semantic failure");
        assert!(issues.iter().any(|issue| matches!(
            issue,
            SemanticIssue::DuplicateType { name } if name == "User"
        )));
        assert!(err.to_string().contains("User"));
    }
}

#[test]
fn circular_types_are_legal() {
    let schema = validate_document(&json!({
        "types": [
            { "name": "A", "fields": { "b": "B" } },
            { "name": "B", "fields": { "a": "A" } }
        ],
        "procedures": [{ "name": "Noop", "kind": "mutation" }]
    }))
    .unwrap();
    assert_eq!(schema.types.len(), 2);
}

#[test]
fn unresolved_output_reference_names_type_and_path() {
    let err = validate_document(&json!({
        "procedures": [
            { "name": "GetUser", "kind": "query", "output": { "user": "Ghost" } }
        ]
    }))
    .unwrap_err();

    let issues = err.semantic_issues().expect("semantic failure").clone();
    assert_eq!(
        issues.into_inner(),
        vec![SemanticIssue::UnresolvedReference {
            name: "Ghost".into(),
            path: "procedure:GetUser:output.user".into(),
        }]
    );
}

#[test]
fn unresolved_references_in_arrays_and_streams() {
    let err = validate_document(&json!({
        "procedures": [{ "name": "Ping", "kind": "query" }],
        "streams": [
            { "name": "Feed", "input": { "filters": "Filter[][]" }, "output": { "item": "Item" } }
        ]
    }))
    .unwrap_err();

    let names: Vec<_> = err
        .semantic_issues()
        .unwrap()
        .iter()
        .map(|issue| issue.to_string())
        .collect();
    assert_eq!(
        names,
        [
            "unresolved type reference: Filter (at stream:Feed:input.filters)",
            "unresolved type reference: Item (at stream:Feed:output.item)",
        ]
    );
}

#[test]
fn classification_is_total_and_exclusive() {
    let cases = [
        ("string", Some(TypeClass::Primitive)),
        ("boolean", Some(TypeClass::Primitive)),
        ("Order", Some(TypeClass::Custom)),
        ("object", Some(TypeClass::Object)),
        ("string[]", Some(TypeClass::Array)),
        ("User[][]", Some(TypeClass::Array)),
        ("order", None),
        ("", None),
        ("[]string", None),
    ];
    for (input, expected) in cases {
        assert_eq!(classify(input), expected, "classify({input:?})");
    }

    let string_array: FieldType = "string[]".parse().unwrap();
    assert_eq!(string_array.base(), &FieldType::Primitive(Primitive::String));
    assert_eq!(parse_array("User[][]"), ("User", 2));
}
