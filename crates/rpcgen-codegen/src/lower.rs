//! Schema to [`Module`] lowering, shared by every target.

use crate::ir::{
    Block, Call, Endpoint, EndpointKind, FieldDecl, Module, Record, Route, Runtime, Service,
    TypeRef, Validation, ValidatorBase, ValidatorExpr,
};
use crate::options::GenerateOptions;
use rpcgen_schema::{Field, FieldMap, FieldType, HttpMethod, MetaMap, RuleKind, Schema};
use std::collections::{HashMap, HashSet};

/// Derive the blocks of one generated unit.
///
/// Block order: core runtime, domain types, endpoint types, then (as
/// requested) validation, server and client.
pub fn lower(schema: &Schema, options: &GenerateOptions) -> Module {
    let graph = ValueGraph::new(schema);
    let mut blocks = vec![Block::Runtime(Runtime::Core)];

    if !schema.types.is_empty() {
        let records = schema
            .types
            .iter()
            .map(|ty| Record {
                name: ty.name.clone(),
                doc: ty.desc.clone(),
                fields: field_decls(&ty.fields, Some(&ty.name), &graph),
            })
            .collect();
        blocks.push(Block::Types(records));
    }

    let endpoints = endpoints(schema, &graph);

    if options.needs_validation() {
        blocks.push(Block::Runtime(Runtime::Validation));
    }
    blocks.push(Block::Endpoints(endpoints.clone()));
    if options.needs_validation() {
        blocks.push(Block::Validation(validation(schema)));
    }

    let routes: Vec<Route> = endpoints
        .iter()
        .map(|e| Route {
            name: e.name.clone(),
            method: e.method,
            stream: e.is_stream(),
            doc: e.doc.clone(),
            has_input: e.input.is_some(),
        })
        .collect();

    if options.include_server {
        blocks.push(Block::Runtime(Runtime::Server));
        blocks.push(Block::Server(Service {
            validate: options.validates_on_server(),
            default_transport: false,
            endpoints: routes.clone(),
        }));
    }
    if options.include_client {
        blocks.push(Block::Runtime(Runtime::Client));
        if options.default_transport() {
            blocks.push(Block::Runtime(Runtime::DefaultTransport));
        }
        blocks.push(Block::Client(Service {
            validate: options.validates_on_client(),
            default_transport: options.default_transport(),
            endpoints: routes,
        }));
    }

    Module { blocks }
}

fn endpoints(schema: &Schema, graph: &ValueGraph) -> Vec<Endpoint> {
    let procedures = schema.procedures.iter().map(|p| {
        let kind = match p.kind {
            rpcgen_schema::ProcedureKind::Query => EndpointKind::Query,
            rpcgen_schema::ProcedureKind::Mutation => EndpointKind::Mutation,
        };
        endpoint(
            &p.name,
            kind,
            p.kind.http_method(),
            p.desc.as_ref(),
            [p.input.as_ref(), p.output.as_ref()],
            p.meta.as_ref(),
            graph,
        )
    });
    let streams = schema.streams.iter().map(|s| {
        endpoint(
            &s.name,
            EndpointKind::Stream,
            HttpMethod::Post,
            s.desc.as_ref(),
            [s.input.as_ref(), s.output.as_ref()],
            s.meta.as_ref(),
            graph,
        )
    });
    procedures.chain(streams).collect()
}

fn endpoint(
    name: &str,
    kind: EndpointKind,
    method: HttpMethod,
    doc: Option<&String>,
    [input, output]: [Option<&FieldMap>; 2],
    meta: Option<&MetaMap>,
    graph: &ValueGraph,
) -> Endpoint {
    // An empty field map is the same as no fields at all.
    let record = |fields: Option<&FieldMap>| {
        fields
            .filter(|f| !f.is_empty())
            .map(|f| field_decls(f, None, graph))
    };
    Endpoint {
        name: name.to_string(),
        kind,
        method,
        doc: doc.cloned(),
        input: record(input),
        output: record(output),
        meta: meta
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
    }
}

fn field_decls(fields: &FieldMap, owner: Option<&str>, graph: &ValueGraph) -> Vec<FieldDecl> {
    fields
        .iter()
        .map(|(name, field)| FieldDecl {
            name: name.clone(),
            ty: type_ref(field.ty(), field.fields(), owner, field.is_optional(), graph),
            optional: field.is_optional(),
            doc: field.desc().map(str::to_string),
        })
        .collect()
}

fn type_ref(
    ty: &FieldType,
    nested: Option<&FieldMap>,
    owner: Option<&str>,
    optional: bool,
    graph: &ValueGraph,
) -> TypeRef {
    match ty {
        FieldType::Primitive(p) => TypeRef::from(*p),
        FieldType::Custom(name) => TypeRef::Named {
            name: name.clone(),
            boxed: !optional && owner.is_some_and(|owner| graph.reaches(name, owner)),
        },
        FieldType::Object => TypeRef::Inline(
            nested
                .map(|fields| field_decls(fields, owner, graph))
                .unwrap_or_default(),
        ),
        FieldType::Array {
            element,
            dimensions,
        } => {
            // Array elements never embed by value, so no owner is passed down.
            let element = type_ref(element, nested, None, false, graph);
            (0..*dimensions).fold(element, |inner, _| TypeRef::Array(Box::new(inner)))
        }
    }
}

/// Which declared types hold which others by value: through required
/// custom fields, directly or inside required inline objects.
struct ValueGraph<'a> {
    edges: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ValueGraph<'a> {
    fn new(schema: &'a Schema) -> Self {
        let edges = schema
            .types
            .iter()
            .map(|ty| {
                let mut out = Vec::new();
                Self::collect(&ty.fields, &mut out);
                (ty.name.as_str(), out)
            })
            .collect();
        Self { edges }
    }

    fn collect(fields: &'a FieldMap, out: &mut Vec<&'a str>) {
        for field in fields.values().filter(|f| !f.is_optional()) {
            match field.ty() {
                FieldType::Custom(name) => out.push(name),
                FieldType::Object => {
                    if let Some(nested) = field.fields() {
                        Self::collect(nested, out);
                    }
                }
                _ => {}
            }
        }
    }

    /// Whether `from` holds `to` by value, possibly through other types.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(next) = self.edges.get(current) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }
}

fn validation(schema: &Schema) -> Validation {
    let types = schema
        .types
        .iter()
        .map(|ty| (ty.name.clone(), object_validator(&ty.fields)))
        .collect();
    let procedure_inputs = schema.procedures.iter().map(|p| (&p.name, &p.input));
    let stream_inputs = schema.streams.iter().map(|s| (&s.name, &s.input));
    let inputs = procedure_inputs
        .chain(stream_inputs)
        .filter_map(|(name, input)| {
            let fields = input.as_ref().filter(|f| !f.is_empty())?;
            Some((name.clone(), object_validator(fields)))
        })
        .collect();
    Validation { types, inputs }
}

fn object_validator(fields: &FieldMap) -> ValidatorExpr {
    ValidatorExpr {
        base: ValidatorBase::Object(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), field_validator(field)))
                .collect(),
        ),
        calls: Vec::new(),
    }
}

/// Rules become calls in declaration order. A field that is not optional
/// and carries no explicit `required` rule gets a trailing `required` call.
fn field_validator(field: &Field) -> ValidatorExpr {
    let mut calls: Vec<Call> = field
        .rules()
        .iter()
        .map(|rule| Call {
            rule: rule.kind.clone(),
            message: rule.message.clone(),
        })
        .collect();
    let explicit = calls.iter().any(|c| c.rule == RuleKind::Required);
    if !field.is_optional() && !explicit {
        calls.push(Call {
            rule: RuleKind::Required,
            message: None,
        });
    }
    ValidatorExpr {
        base: base_validator(field.ty(), field.fields()),
        calls,
    }
}

fn base_validator(ty: &FieldType, nested: Option<&FieldMap>) -> ValidatorBase {
    match ty {
        FieldType::Primitive(p) => ValidatorBase::Scalar(*p),
        FieldType::Custom(name) => ValidatorBase::Ref(name.clone()),
        FieldType::Object => match nested {
            Some(fields) => object_validator(fields).base,
            None => ValidatorBase::Object(Vec::new()),
        },
        FieldType::Array {
            element,
            dimensions,
        } => {
            let element = ValidatorExpr {
                base: base_validator(element, nested),
                calls: Vec::new(),
            };
            let wrapped = (1..*dimensions).fold(element, |inner, _| ValidatorExpr {
                base: ValidatorBase::Array(Box::new(inner)),
                calls: Vec::new(),
            });
            ValidatorBase::Array(Box::new(wrapped))
        }
    }
}
