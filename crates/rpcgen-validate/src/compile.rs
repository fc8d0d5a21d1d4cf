//! Build validators straight from a checked [`Schema`].
//!
//! Types may refer to each other (or themselves), so a reference to a custom
//! type compiles to a lazy validator that looks its target up by name when
//! it runs. The lookup table is filled once every type is compiled.

use crate::error::Invalid;
use crate::validator::{LazyValidator, Validator};
use indexmap::IndexMap;
use rpcgen_schema::{Field, FieldMap, FieldType, Primitive, Schema};
use serde_json::Value;
use std::sync::{Arc, OnceLock, Weak};

type Table = OnceLock<IndexMap<String, Arc<Validator>>>;

/// Validators for every type and every procedure or stream input.
#[derive(Debug)]
pub struct SchemaValidators {
    types: Arc<Table>,
    inputs: IndexMap<String, Validator>,
}

impl SchemaValidators {
    pub fn new(schema: &Schema) -> Self {
        let table: Arc<Table> = Arc::new(OnceLock::new());
        let compiler = Compiler {
            table: Arc::downgrade(&table),
        };

        let types = schema
            .types
            .iter()
            .map(|ty| (ty.name.clone(), Arc::new(compiler.object(&ty.fields))))
            .collect();
        let _ = table.set(types);

        let procedure_inputs = schema
            .procedures
            .iter()
            .map(|p| (&p.name, p.input.as_ref()));
        let stream_inputs = schema.streams.iter().map(|s| (&s.name, s.input.as_ref()));
        let inputs = procedure_inputs
            .chain(stream_inputs)
            .filter_map(|(name, input)| Some((name.clone(), compiler.object(input?))))
            .collect();

        tracing::debug!(types = schema.types.len(), "compiled schema validators");
        Self {
            types: table,
            inputs,
        }
    }

    /// The validator for a declared type.
    pub fn type_validator(&self, name: &str) -> Option<&Validator> {
        self.types.get()?.get(name).map(Arc::as_ref)
    }

    /// The input validator of a procedure or stream. `None` when the name is
    /// unknown or the input declares no fields.
    pub fn input_validator(&self, name: &str) -> Option<&Validator> {
        self.inputs.get(name)
    }

    /// Validate a procedure or stream input. Endpoints with no declared
    /// input accept anything.
    pub fn validate_input(&self, name: &str, input: Option<&Value>) -> Result<(), Invalid> {
        match self.inputs.get(name) {
            Some(validator) => validator.validate(input),
            None => Ok(()),
        }
    }
}

struct Compiler {
    table: Weak<Table>,
}

impl Compiler {
    fn object(&self, fields: &FieldMap) -> Validator {
        fields
            .iter()
            .fold(Validator::object(), |object, (name, field)| {
                object.field(name.clone(), self.field(field))
            })
            .into()
    }

    /// Rules apply in declaration order. Every non-optional field ends up
    /// required, with the message of an explicit `required` rule if any.
    fn field(&self, field: &Field) -> Validator {
        let validator = field
            .rules()
            .iter()
            .fold(self.ty(field.ty(), field.fields()), Validator::with_rule);
        if field.is_optional() || validator.is_required() {
            validator
        } else {
            validator.required()
        }
    }

    fn ty(&self, ty: &FieldType, nested: Option<&FieldMap>) -> Validator {
        match ty {
            FieldType::Primitive(p) => scalar(*p),
            FieldType::Custom(name) => self.reference(name),
            FieldType::Object => match nested {
                Some(fields) => self.object(fields),
                None => Validator::object().into(),
            },
            FieldType::Array {
                element,
                dimensions,
            } => (0..*dimensions).fold(self.ty(element, nested), |inner, _| {
                Validator::array(inner).into()
            }),
        }
    }

    fn reference(&self, name: &str) -> Validator {
        let table = self.table.clone();
        let name = name.to_string();
        LazyValidator::fallible(move || {
            let table = table.upgrade()?;
            table.get()?.get(&name).cloned()
        })
        .into()
    }
}

fn scalar(primitive: Primitive) -> Validator {
    match primitive {
        Primitive::String => Validator::string().into(),
        Primitive::Int => Validator::int().into(),
        Primitive::Float => Validator::float().into(),
        Primitive::Boolean => Validator::boolean().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcgen_schema::validate_document;
    use serde_json::json;

    fn compile(doc: Value) -> SchemaValidators {
        SchemaValidators::new(&validate_document(&doc).unwrap())
    }

    #[test]
    fn non_optional_fields_are_required() {
        let validators = compile(json!({
            "procedures": [{
                "name": "CreateUser",
                "kind": "mutation",
                "input": {
                    "name": "string",
                    "nick": { "type": "string", "optional": true },
                    "email": {
                        "type": "string",
                        "rules": [{ "rule": "required", "message": "email is mandatory" }]
                    }
                }
            }]
        }));

        let err = validators
            .validate_input("CreateUser", Some(&json!({ "email": "a@b.c" })))
            .unwrap_err();
        assert_eq!(err.message, "Field is required");

        let err = validators
            .validate_input("CreateUser", Some(&json!({ "name": "Ada" })))
            .unwrap_err();
        assert_eq!(err.message, "email is mandatory");

        assert!(
            validators
                .validate_input("CreateUser", Some(&json!({ "name": "Ada", "email": "x" })))
                .is_ok()
        );
    }

    #[test]
    fn recursive_types_validate_through_references() {
        let validators = compile(json!({
            "types": [{
                "name": "Node",
                "fields": {
                    "label": { "type": "string", "rules": [{ "rule": "minLength", "value": 1 }] },
                    "children": { "type": "Node[]", "optional": true }
                }
            }],
            "procedures": [
                { "name": "Save", "kind": "mutation", "input": { "root": "Node" } }
            ]
        }));

        let deep = json!({ "root": {
            "label": "a",
            "children": [{ "label": "b", "children": [{ "label": "" }] }]
        }});
        let err = validators.validate_input("Save", Some(&deep)).unwrap_err();
        assert_eq!(err.message, "String must be at least 1 characters long");

        let node = validators.type_validator("Node").unwrap();
        assert!(node.validate(Some(&json!({ "label": "leaf" }))).is_ok());
    }

    #[test]
    fn nested_objects_and_matrices() {
        let validators = compile(json!({
            "procedures": [{
                "name": "Plot",
                "kind": "query",
                "input": {
                    "grid": "int[][]",
                    "points": {
                        "type": "object[]",
                        "fields": { "x": "float", "y": "float" }
                    }
                }
            }]
        }));

        let ok = json!({ "grid": [[1, 2], [3]], "points": [{ "x": 0.5, "y": 1 }] });
        assert!(validators.validate_input("Plot", Some(&ok)).is_ok());

        let bad = json!({ "grid": [[1, 2.5]], "points": [] });
        assert_eq!(
            validators.validate_input("Plot", Some(&bad)).unwrap_err().message,
            "Invalid type, expected int"
        );

        let bad = json!({ "grid": [], "points": [{ "x": 1 }] });
        assert_eq!(
            validators.validate_input("Plot", Some(&bad)).unwrap_err().message,
            "Field is required"
        );
    }

    #[test]
    fn endpoints_without_input_accept_anything() {
        let validators = compile(json!({
            "procedures": [{ "name": "Ping", "kind": "query" }],
            "streams": [{ "name": "Ticks", "input": { "every": "int" } }]
        }));
        assert!(validators.validate_input("Ping", Some(&json!(42))).is_ok());
        assert!(validators.input_validator("Ticks").is_some());
        assert!(validators.validate_input("Ticks", Some(&json!({}))).is_err());
    }

    #[test]
    fn required_references_reject_absent_values() {
        let validators = compile(json!({
            "types": [{ "name": "User", "fields": { "id": "string" } }],
            "procedures": [
                { "name": "Save", "kind": "mutation", "input": { "user": "User" } }
            ]
        }));
        for input in [json!({}), json!({ "user": null })] {
            assert_eq!(
                validators.validate_input("Save", Some(&input)).unwrap_err().message,
                "Field is required"
            );
        }
        assert!(
            validators
                .validate_input("Save", Some(&json!({ "user": { "id": "u1" } })))
                .is_ok()
        );
    }

    #[test]
    fn references_share_the_compiled_target() {
        let validators = compile(json!({
            "types": [{ "name": "T", "fields": { "x": "int" } }],
            "procedures": [{ "name": "P", "kind": "query", "input": { "t": "T" } }]
        }));
        let compiler = Compiler {
            table: Arc::downgrade(&validators.types),
        };
        let Validator::Lazy(reference) = compiler.reference("T") else {
            panic!("references compile to lazy validators");
        };
        let first = reference.resolve().unwrap();
        let second = reference.resolve().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(std::ptr::eq(first.as_ref(), validators.type_validator("T").unwrap()));
    }

    #[test]
    fn dropped_table_resolves_to_nothing() {
        let validators = compile(json!({
            "types": [{ "name": "T", "fields": { "x": "int" } }],
            "procedures": [{ "name": "P", "kind": "query", "input": { "t": "T" } }]
        }));
        let input = validators.input_validator("P").unwrap().clone();
        drop(validators);
        assert_eq!(
            input.validate(Some(&json!({ "t": {} }))).unwrap_err().message,
            "Referenced schema is not defined"
        );
    }
}
