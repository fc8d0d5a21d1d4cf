//! The validated schema value.
//!
//! These types mirror the interface document one to one. Maps are
//! [`IndexMap`]s so declaration order survives into generated code, and
//! optional keys are skipped on serialization so a validated schema
//! serializes back to the document it came from.

use crate::types::{FieldType, Primitive};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named fields in declaration order.
pub type FieldMap = IndexMap<String, Field>;

/// Procedure or stream metadata in declaration order.
pub type MetaMap = IndexMap<String, Scalar>;

/// Root of an interface document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDef>,
    pub procedures: Vec<Procedure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<Stream>,
}

/// A named, reusable group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl ProcedureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcedureKind::Query => "query",
            ProcedureKind::Mutation => "mutation",
        }
    }

    /// Queries are read-only and travel as GET; mutations as POST.
    pub fn http_method(self) -> HttpMethod {
        match self {
            ProcedureKind::Query => HttpMethod::Get,
            ProcedureKind::Mutation => HttpMethod::Post,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A request/response operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub kind: ProcedureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaMap>,
}

/// A server-to-client event stream. Shares the procedure namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaMap>,
}

/// A field is either a bare type annotation or a detailed declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Type(FieldType),
    Detailed(DetailedField),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedField {
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
}

impl Field {
    pub fn ty(&self) -> &FieldType {
        match self {
            Field::Type(ty) => ty,
            Field::Detailed(d) => &d.ty,
        }
    }

    pub fn desc(&self) -> Option<&str> {
        match self {
            Field::Type(_) => None,
            Field::Detailed(d) => d.desc.as_deref(),
        }
    }

    /// Only an explicit `optional: true` makes a field optional.
    pub fn is_optional(&self) -> bool {
        match self {
            Field::Type(_) => false,
            Field::Detailed(d) => d.optional.unwrap_or(false),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        match self {
            Field::Type(_) => &[],
            Field::Detailed(d) => &d.rules,
        }
    }

    /// Nested fields of an `object` (or `object[]`) field.
    pub fn fields(&self) -> Option<&FieldMap> {
        match self {
            Field::Type(_) => None,
            Field::Detailed(d) => d.fields.as_ref(),
        }
    }

    /// Custom message of an explicit `required` rule, if one is declared.
    pub fn required_message(&self) -> Option<&str> {
        self.rules().iter().find_map(|rule| match rule.kind {
            RuleKind::Required => rule.message.as_deref(),
            _ => None,
        })
    }
}

/// A string, number, or boolean literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
}

impl Scalar {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::String(s) => serde_json::Value::String(s.clone()),
            Scalar::Number(n) => serde_json::Value::Number(n.clone()),
            Scalar::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

/// A declarative constraint attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(flatten)]
    pub kind: RuleKind,
    /// Overrides the rule's default failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    Regex { value: String },
    Equals { value: Scalar },
    Contains { value: String },
    Length {
        #[serde(deserialize_with = "count")]
        value: u64,
    },
    MinLength {
        #[serde(deserialize_with = "count")]
        value: u64,
    },
    MaxLength {
        #[serde(deserialize_with = "count")]
        value: u64,
    },
    Min { value: serde_json::Number },
    Max { value: serde_json::Number },
    Enum { value: Vec<Scalar> },
    Email,
    Iso8601,
    Uuid,
    Json,
    Lowercase,
    Uppercase,
}

/// A non-negative count. `3.0` is accepted as `3`, as JSON Schema's
/// `integer` does.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = n.as_u64() {
        return Ok(n);
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        _ => Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, found {n}"
        ))),
    }
}

/// Which field types a rule may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    Any,
    String,
    Numeric,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Regex { .. } => "regex",
            RuleKind::Equals { .. } => "equals",
            RuleKind::Contains { .. } => "contains",
            RuleKind::Length { .. } => "length",
            RuleKind::MinLength { .. } => "minLength",
            RuleKind::MaxLength { .. } => "maxLength",
            RuleKind::Min { .. } => "min",
            RuleKind::Max { .. } => "max",
            RuleKind::Enum { .. } => "enum",
            RuleKind::Email => "email",
            RuleKind::Iso8601 => "iso8601",
            RuleKind::Uuid => "uuid",
            RuleKind::Json => "json",
            RuleKind::Lowercase => "lowercase",
            RuleKind::Uppercase => "uppercase",
        }
    }

    pub fn target(&self) -> RuleTarget {
        match self {
            RuleKind::Required | RuleKind::Equals { .. } | RuleKind::Enum { .. } => RuleTarget::Any,
            RuleKind::Min { .. } | RuleKind::Max { .. } => RuleTarget::Numeric,
            _ => RuleTarget::String,
        }
    }

    /// Whether the rule can constrain a value of the given field type.
    /// String and numeric rules only apply to scalars, never to arrays.
    pub fn applies_to(&self, ty: &FieldType) -> bool {
        match self.target() {
            RuleTarget::Any => true,
            RuleTarget::String => ty.as_primitive() == Some(Primitive::String),
            RuleTarget::Numeric => ty.as_primitive().is_some_and(Primitive::is_numeric),
        }
    }
}

impl Schema {
    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name == name)
    }

    pub fn find_stream(&self, name: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_reads_flattened_tag_and_message() {
        let rule: Rule = serde_json::from_value(json!({
            "rule": "minLength",
            "value": 3,
            "message": "too short"
        }))
        .unwrap();
        assert_eq!(rule.kind, RuleKind::MinLength { value: 3 });
        assert_eq!(rule.message.as_deref(), Some("too short"));
    }

    #[test]
    fn counts_accept_integral_floats() {
        let rule: Rule = serde_json::from_value(json!({ "rule": "length", "value": 3.0 })).unwrap();
        assert_eq!(rule.kind, RuleKind::Length { value: 3 });

        assert!(serde_json::from_value::<Rule>(json!({ "rule": "length", "value": 3.5 })).is_err());
        assert!(serde_json::from_value::<Rule>(json!({ "rule": "length", "value": -1 })).is_err());
    }

    #[test]
    fn unit_rules_serialize_as_tag_only() {
        let rule = Rule {
            kind: RuleKind::Email,
            message: None,
        };
        assert_eq!(serde_json::to_value(&rule).unwrap(), json!({"rule": "email"}));
    }

    #[test]
    fn bare_and_detailed_fields_share_accessors() {
        let bare: Field = serde_json::from_value(json!("User[]")).unwrap();
        assert_eq!(bare.ty().custom_name(), Some("User"));
        assert!(!bare.is_optional());
        assert!(bare.rules().is_empty());

        let detailed: Field = serde_json::from_value(json!({
            "type": "string",
            "optional": true,
            "rules": [{"rule": "email"}]
        }))
        .unwrap();
        assert!(detailed.is_optional());
        assert_eq!(detailed.rules().len(), 1);
    }

    #[test]
    fn rule_compatibility() {
        let string: FieldType = "string".parse().unwrap();
        let int: FieldType = "int".parse().unwrap();
        let strings: FieldType = "string[]".parse().unwrap();

        assert!(RuleKind::Email.applies_to(&string));
        assert!(!RuleKind::Email.applies_to(&int));
        assert!(!RuleKind::Email.applies_to(&strings));
        assert!(RuleKind::Required.applies_to(&strings));

        let min = RuleKind::Min {
            value: serde_json::Number::from(1),
        };
        assert!(min.applies_to(&int));
        assert!(!min.applies_to(&string));
    }

    #[test]
    fn kinds_map_to_http_methods() {
        assert_eq!(ProcedureKind::Query.http_method().as_str(), "GET");
        assert_eq!(ProcedureKind::Mutation.http_method().as_str(), "POST");
    }
}
