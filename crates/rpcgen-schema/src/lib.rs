//! Type model and validation for rpcgen interface documents.
//!
//! An interface document declares reusable types, procedures and streams.
//! Upstream front ends parse the human-written syntax into a JSON-shaped
//! document; this crate turns that document into a checked [`Schema`].
//!
//! # Pipeline
//!
//! ```text
//! document (serde_json::Value)
//!    │
//!    ├─ phase 1: structural ── grammar (JSON Schema) + rule placement
//!    │
//!    └─ phase 2: semantic ──── unique names + type references resolve
//!    │
//!    ▼
//! Schema
//! ```
//!
//! Each phase aggregates every problem it finds before failing.
//!
//! # Example
//!
//! ```
//! use rpcgen_schema::validate_document;
//!
//! let doc = serde_json::json!({
//!     "types": [{ "name": "User", "fields": { "id": "string", "friends": "User[]" } }],
//!     "procedures": [
//!         { "name": "GetUser", "kind": "query", "input": { "id": "string" }, "output": { "user": "User" } }
//!     ]
//! });
//!
//! let schema = validate_document(&doc).unwrap();
//! assert_eq!(schema.types[0].name, "User");
//! ```

pub mod error;
pub mod model;
pub mod semantic;
pub mod structural;
pub mod types;

pub use error::{SchemaError, SemanticIssue, SemanticIssues, Violation, Violations};
pub use model::{
    DetailedField, Field, FieldMap, HttpMethod, MetaMap, Procedure, ProcedureKind, Rule, RuleKind,
    RuleTarget, Scalar, Schema, Stream, TypeDef,
};
pub use types::{
    FieldType, InvalidFieldType, Primitive, TypeClass, classify, is_custom_name,
    is_valid_field_type, parse_array,
};

use serde_json::Value;

/// Validate an in-memory document: structural phase, then semantic phase.
pub fn validate_document(document: &Value) -> Result<Schema, SchemaError> {
    let schema = structural::check(document)?;
    semantic::check(&schema)?;
    tracing::debug!(
        types = schema.types.len(),
        procedures = schema.procedures.len(),
        streams = schema.streams.len(),
        "schema validated"
    );
    Ok(schema)
}

/// Parse JSON text and validate it.
pub fn parse_document(source: &str) -> Result<Schema, SchemaError> {
    let document: Value =
        serde_json::from_str(source).map_err(|e| SchemaError::Parsing(e.to_string()))?;
    validate_document(&document)
}
