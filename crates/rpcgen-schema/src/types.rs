//! Type model: the vocabulary of field type annotations.
//!
//! A type annotation is a string such as `string`, `User`, `object` or
//! `User[][]`. This module classifies those strings and parses them into
//! [`FieldType`] values. Everything here is pure.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static CUSTOM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("static regex"));

const ARRAY_SUFFIX: &str = "[]";
const OBJECT: &str = "object";

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Int,
    Float,
    Boolean,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::String,
        Primitive::Int,
        Primitive::Float,
        Primitive::Boolean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Boolean => "boolean",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Primitive::Int | Primitive::Float)
    }
}

/// The four ways a type annotation can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Primitive,
    Custom,
    Object,
    Array,
}

/// Classify a type annotation.
///
/// Returns `None` when the string is not a legal annotation at all. For
/// legal strings exactly one class applies: array suffixes win over the
/// class of the base.
pub fn classify(type_str: &str) -> Option<TypeClass> {
    let (base, dimensions) = parse_array(type_str);
    let class = classify_base(base)?;
    if dimensions > 0 {
        Some(TypeClass::Array)
    } else {
        Some(class)
    }
}

fn classify_base(base: &str) -> Option<TypeClass> {
    if Primitive::from_name(base).is_some() {
        Some(TypeClass::Primitive)
    } else if base == OBJECT {
        Some(TypeClass::Object)
    } else if is_custom_name(base) {
        Some(TypeClass::Custom)
    } else {
        None
    }
}

/// Split trailing `[]` suffixes off a type annotation.
///
/// Never fails: a non-array string comes back unchanged with dimension 0.
pub fn parse_array(type_str: &str) -> (&str, usize) {
    let mut base = type_str;
    let mut dimensions = 0;
    while let Some(stripped) = base.strip_suffix(ARRAY_SUFFIX) {
        base = stripped;
        dimensions += 1;
    }
    (base, dimensions)
}

/// Whether the string is a legal type annotation.
pub fn is_valid_field_type(type_str: &str) -> bool {
    classify(type_str).is_some()
}

/// Whether the string is an UpperCamel identifier usable as a type or
/// procedure name.
pub fn is_custom_name(name: &str) -> bool {
    CUSTOM_NAME.is_match(name)
}

/// A parsed type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Primitive(Primitive),
    /// Reference to a declared type, resolved by name.
    Custom(String),
    /// Anonymous object; its shape comes from the field's `fields`.
    Object,
    /// `element` is never itself an array; nesting is counted in `dimensions`.
    Array {
        element: Box<FieldType>,
        dimensions: usize,
    },
}

impl FieldType {
    /// Wrap a base type in `dimensions` array levels. Zero dimensions
    /// returns the base unchanged.
    pub fn array_of(base: FieldType, dimensions: usize) -> FieldType {
        match (base, dimensions) {
            (base, 0) => base,
            (
                FieldType::Array {
                    element,
                    dimensions: inner,
                },
                outer,
            ) => FieldType::Array {
                element,
                dimensions: inner + outer,
            },
            (base, dimensions) => FieldType::Array {
                element: Box::new(base),
                dimensions,
            },
        }
    }

    pub fn class(&self) -> TypeClass {
        match self {
            FieldType::Primitive(_) => TypeClass::Primitive,
            FieldType::Custom(_) => TypeClass::Custom,
            FieldType::Object => TypeClass::Object,
            FieldType::Array { .. } => TypeClass::Array,
        }
    }

    /// The non-array type underneath any array wrapping.
    pub fn base(&self) -> &FieldType {
        match self {
            FieldType::Array { element, .. } => element,
            other => other,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            FieldType::Array { dimensions, .. } => *dimensions,
            _ => 0,
        }
    }

    /// Whether the base type is an anonymous object (`object`, `object[]`, ...).
    pub fn is_object(&self) -> bool {
        matches!(self.base(), FieldType::Object)
    }

    /// Name of the referenced custom type, looking through arrays.
    pub fn custom_name(&self) -> Option<&str> {
        match self.base() {
            FieldType::Custom(name) => Some(name),
            _ => None,
        }
    }

    /// The primitive underneath, if this is a scalar (not an array).
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            FieldType::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => f.write_str(p.as_str()),
            FieldType::Custom(name) => f.write_str(name),
            FieldType::Object => f.write_str(OBJECT),
            FieldType::Array {
                element,
                dimensions,
            } => {
                write!(f, "{element}")?;
                for _ in 0..*dimensions {
                    f.write_str(ARRAY_SUFFIX)?;
                }
                Ok(())
            }
        }
    }
}

/// A string that is not a legal type annotation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field type: `{0}`")]
pub struct InvalidFieldType(pub String);

impl FromStr for FieldType {
    type Err = InvalidFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, dimensions) = parse_array(s);
        let base_type = match classify_base(base) {
            Some(TypeClass::Primitive) => {
                FieldType::Primitive(Primitive::from_name(base).ok_or_else(|| InvalidFieldType(s.into()))?)
            }
            Some(TypeClass::Object) => FieldType::Object,
            Some(TypeClass::Custom) => FieldType::Custom(base.to_string()),
            Some(TypeClass::Array) | None => return Err(InvalidFieldType(s.to_string())),
        };
        Ok(FieldType::array_of(base_type, dimensions))
    }
}

impl TryFrom<String> for FieldType {
    type Error = InvalidFieldType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}
