//! Go printer.
//!
//! Go has no literal object types, so endpoint metadata is carried as
//! `map[string]any` in the `Procedures` table rather than as per-endpoint
//! types.

use crate::error::GenerateError;
use crate::ir::{
    Block, Call, Endpoint, FieldDecl, Module, Record, Route, Runtime, Service, TypeRef,
    Validation, ValidatorBase, ValidatorExpr,
};
use crate::options::GenerateOptions;
use crate::templates;
use crate::traits::Backend;
use regex::Regex;
use rpcgen_schema::{HttpMethod, Primitive, RuleKind, Scalar};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Static instance of the Go backend for the registry.
pub static GO_BACKEND: GoBackend = GoBackend;

pub struct GoBackend;

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["golang"]
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        &[
            "AfterMiddleware",
            "BeforeMiddleware",
            "Client",
            "ClientAfter",
            "ClientBefore",
            "ClientOption",
            "DefaultReconnect",
            "ErrNoTransport",
            "ErrorBody",
            "HTTPTransport",
            "Handlers",
            "HttpMethod",
            "MethodGet",
            "MethodPost",
            "OutgoingRequest",
            "ProcedureInfo",
            "Procedures",
            "ReconnectOptions",
            "RequestContext",
            "Response",
            "RpcError",
            "Server",
            "ServerOption",
            "Transport",
            "TypeTag",
            "V",
            "ValidateInput",
            "Validator",
        ]
    }

    fn render(&self, module: &Module, options: &GenerateOptions) -> Result<String, GenerateError> {
        let package = options.package_name();
        if !is_package_name(package) {
            return Err(GenerateError::InvalidPackage(package.to_string()));
        }
        Ok(GoWriter::emit(module, package))
    }
}

/// Go keywords and the predeclared identifier that may not name a package.
const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "_",
];

fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !KEYWORDS.contains(&name)
}

/// Standard library packages the runtime templates may use.
const STD_PACKAGES: &[&str] = &[
    "bufio",
    "bytes",
    "context",
    "encoding/json",
    "errors",
    "fmt",
    "io",
    "math",
    "net/http",
    "net/url",
    "reflect",
    "regexp",
    "strconv",
    "strings",
    "time",
    "unicode/utf8",
];

static QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z][a-z0-9]*)\.[A-Z]").expect("static regex"));

/// Imports used by a set of runtime templates, sorted.
pub fn imports(runtimes: &[Runtime]) -> Vec<&'static str> {
    let used: HashSet<&str> = runtimes
        .iter()
        .flat_map(|r| QUALIFIED.captures_iter(templates::go::runtime(*r)))
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let sorted: BTreeSet<&'static str> = STD_PACKAGES
        .iter()
        .copied()
        .filter(|path| used.contains(path.rsplit('/').next().unwrap_or(*path)))
        .collect();
    sorted.into_iter().collect()
}

/// Emits a module as Go source code.
pub struct GoWriter {
    output: String,
    indent: usize,
}

impl GoWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a module to Go source under `package`.
    pub fn emit(module: &Module, package: &str) -> String {
        let mut writer = Self::new();
        writer.line("// Code generated by rpcgen. DO NOT EDIT.");
        writer.blank();
        writer.line(&format!("package {package}"));

        let runtimes: Vec<Runtime> = module
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Runtime(r) => Some(*r),
                _ => None,
            })
            .collect();
        let imports = imports(&runtimes);
        if !imports.is_empty() {
            writer.blank();
            writer.line("import (");
            writer.indent += 1;
            for path in imports {
                writer.line(&format!("\"{path}\""));
            }
            writer.indent -= 1;
            writer.line(")");
        }

        for block in &module.blocks {
            writer.blank();
            writer.write_block(block);
        }
        writer.output
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.output.push('\t');
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    fn write_doc(&mut self, doc: Option<&str>) {
        let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
            return;
        };
        for l in doc.lines() {
            self.line(format!("// {l}").trim_end());
        }
    }

    fn write_block(&mut self, block: &Block) {
        match block {
            Block::Runtime(runtime) => {
                self.output.push_str(templates::go::runtime(*runtime));
            }
            Block::Types(records) => {
                for (i, record) in records.iter().enumerate() {
                    if i > 0 {
                        self.blank();
                    }
                    self.write_record(record);
                }
            }
            Block::Endpoints(endpoints) => self.write_endpoints(endpoints),
            Block::Validation(validation) => self.write_validation(validation),
            Block::Server(service) => self.write_server(service),
            Block::Client(service) => self.write_client(service),
        }
    }

    fn write_record(&mut self, record: &Record) {
        self.write_doc(record.doc.as_deref());
        self.write_struct(&record.name, Some(record.fields.as_slice()));
    }

    fn write_struct(&mut self, name: &str, fields: Option<&[FieldDecl]>) {
        match fields {
            Some(fields) if !fields.is_empty() => {
                self.line(&format!("type {name} {}", struct_type(fields, self.indent)));
            }
            _ => self.line(&format!("type {name} struct{{}}")),
        }
    }

    fn write_endpoints(&mut self, endpoints: &[Endpoint]) {
        for endpoint in endpoints {
            self.write_struct(&endpoint.input_type(), endpoint.input.as_deref());
            self.write_struct(&endpoint.output_type(), endpoint.output.as_deref());
            self.blank();
        }

        self.line("// Procedures describes every procedure and stream by name.");
        self.line("var Procedures = map[string]ProcedureInfo{");
        self.indent += 1;
        for e in endpoints {
            let method = match e.method {
                HttpMethod::Get => "MethodGet",
                HttpMethod::Post => "MethodPost",
            };
            let meta = if e.meta.is_empty() {
                "nil".to_string()
            } else {
                let entries: Vec<String> = e
                    .meta
                    .iter()
                    .map(|(k, v)| format!("{}: {}", string_literal(k), scalar(v)))
                    .collect();
                format!("map[string]any{{{}}}", entries.join(", "))
            };
            self.line(&format!(
                "{}: {{Name: {}, Kind: \"{}\", Method: {method}, Stream: {}, Meta: {meta}}},",
                string_literal(&e.name),
                string_literal(&e.name),
                e.kind.as_str(),
                e.is_stream(),
            ));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_validation(&mut self, validation: &Validation) {
        self.line("var (");
        self.indent += 1;
        self.line("typeSchemas  = map[string]Validator{}");
        self.line("inputSchemas = map[string]Validator{}");
        self.indent -= 1;
        self.line(")");
        self.blank();
        self.line("func lazyType(name string) Validator {");
        self.indent += 1;
        self.line("return V.Lazy(func() (Validator, bool) {");
        self.indent += 1;
        self.line("v, ok := typeSchemas[name]");
        self.line("return v, ok");
        self.indent -= 1;
        self.line("})");
        self.indent -= 1;
        self.line("}");
        self.blank();
        self.line("func init() {");
        self.indent += 1;
        for (name, expr) in &validation.types {
            let rendered = validator(expr, self.indent);
            self.line(&format!("typeSchemas[{}] = {rendered}", string_literal(name)));
        }
        for (name, expr) in &validation.inputs {
            let rendered = validator(expr, self.indent);
            self.line(&format!("inputSchemas[{}] = {rendered}", string_literal(name)));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_server(&mut self, service: &Service) {
        if service.validate {
            self.line("func serverValidate(name string, raw []byte) string {");
            self.indent += 1;
            self.line("return ValidateInput(name, raw)");
        } else {
            self.line("func serverValidate(string, []byte) string {");
            self.indent += 1;
            self.line("return \"\"");
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        self.line("// Handlers implements every procedure and stream. Return *RpcError for a 400.");
        self.line("type Handlers interface {");
        self.indent += 1;
        for route in &service.endpoints {
            self.write_doc(route.doc.as_deref());
            let (input, output) = route_types(route);
            if route.stream {
                self.line(&format!(
                    "{}(ctx context.Context, input {input}, emit func({output}) error) error",
                    route.name
                ));
            } else {
                self.line(&format!(
                    "{}(ctx context.Context, input {input}) ({output}, error)",
                    route.name
                ));
            }
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        let (streams, procedures): (Vec<&Route>, Vec<&Route>) =
            service.endpoints.iter().partition(|r| r.stream);

        self.line("func invoke(ctx context.Context, h Handlers, name string, raw []byte) (any, error) {");
        self.indent += 1;
        self.line("switch name {");
        for route in procedures {
            let (input, _) = route_types(route);
            self.line(&format!("case {}:", string_literal(&route.name)));
            self.indent += 1;
            self.line(&format!("input, err := decodeInput[{input}](raw)"));
            self.write_return_on_error("nil, err");
            self.line(&format!("return h.{}(ctx, input)", route.name));
            self.indent -= 1;
        }
        self.line("}");
        self.line("return nil, &RpcError{Message: \"Unknown procedure: \" + name}");
        self.indent -= 1;
        self.line("}");
        self.blank();

        self.line("func invokeStream(ctx context.Context, h Handlers, name string, raw []byte, emit func(any) error) error {");
        self.indent += 1;
        self.line("switch name {");
        for route in streams {
            let (input, output) = route_types(route);
            self.line(&format!("case {}:", string_literal(&route.name)));
            self.indent += 1;
            self.line(&format!("input, err := decodeInput[{input}](raw)"));
            self.write_return_on_error("err");
            self.line(&format!(
                "return h.{}(ctx, input, func(output {output}) error {{ return emit(output) }})",
                route.name
            ));
            self.indent -= 1;
        }
        self.line("}");
        self.line("return &RpcError{Message: \"Unknown procedure: \" + name}");
        self.indent -= 1;
        self.line("}");
    }

    fn write_return_on_error(&mut self, values: &str) {
        self.line("if err != nil {");
        self.indent += 1;
        self.line(&format!("return {values}"));
        self.indent -= 1;
        self.line("}");
    }

    fn write_client(&mut self, service: &Service) {
        self.line("func defaultTransport() Transport {");
        self.indent += 1;
        if service.default_transport {
            self.line("return &HTTPTransport{}");
        } else {
            self.line("return nil");
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        if service.validate {
            self.line("func clientValidate(name string, input any) string {");
            self.indent += 1;
            self.line("raw, err := json.Marshal(input)");
            self.write_return_on_error("err.Error()");
            self.line("return ValidateInput(name, raw)");
        } else {
            self.line("func clientValidate(string, any) string {");
            self.indent += 1;
            self.line("return \"\"");
        }
        self.indent -= 1;
        self.line("}");

        for route in &service.endpoints {
            self.blank();
            self.write_client_method(route);
        }
    }

    fn write_client_method(&mut self, route: &Route) {
        self.write_doc(route.doc.as_deref());
        let (input, output) = route_types(route);
        let name = &route.name;
        let quoted = string_literal(name);
        if route.stream {
            self.line(&format!(
                "func (c *Client) {name}(ctx context.Context, input {input}, onEvent func(Response[{output}]) error) error {{"
            ));
            self.indent += 1;
            self.line(&format!(
                "return stream[{output}](ctx, c, {quoted}, input, onEvent)"
            ));
        } else {
            let method = match route.method {
                HttpMethod::Get => "MethodGet",
                HttpMethod::Post => "MethodPost",
            };
            self.line(&format!(
                "func (c *Client) {name}(ctx context.Context, input {input}) (Response[{output}], error) {{"
            ));
            self.indent += 1;
            self.line(&format!(
                "return call[{output}](ctx, c, {quoted}, {method}, input)"
            ));
        }
        self.indent -= 1;
        self.line("}");
    }
}

fn route_types(route: &Route) -> (String, String) {
    (format!("{}Input", route.name), format!("{}Output", route.name))
}

/// `user_id` -> `UserId`.
pub fn exported_name(field: &str) -> String {
    let name: String = field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        "Field".to_string()
    } else {
        name
    }
}

/// Exported names for a field list, with numeric suffixes where two fields
/// would collide.
fn exported_names(fields: &[FieldDecl]) -> Vec<String> {
    let mut taken = HashSet::new();
    fields
        .iter()
        .map(|f| {
            let base = exported_name(&f.name);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            name
        })
        .collect()
}

/// A struct type literal whose closing brace sits at `indent`.
fn struct_type(fields: &[FieldDecl], indent: usize) -> String {
    let pad = "\t".repeat(indent + 1);
    let mut out = "struct {\n".to_string();
    for (field, name) in fields.iter().zip(exported_names(fields)) {
        if let Some(doc) = field.doc.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            for l in doc.lines() {
                out.push_str(&format!("{pad}// {}\n", l.trim_end()));
            }
        }
        let omit = if field.optional { ",omitempty" } else { "" };
        out.push_str(&format!(
            "{pad}{name} {} `json:\"{}{omit}\"`\n",
            field_type(&field.ty, field.optional, indent + 1),
            field.name
        ));
    }
    out.push_str(&"\t".repeat(indent));
    out.push('}');
    out
}

/// Optional scalars, records and inline structs become pointers so absence
/// survives a round trip; slices are already nilable.
fn field_type(ty: &TypeRef, optional: bool, indent: usize) -> String {
    let rendered = type_ref(ty, indent);
    match ty {
        TypeRef::Array(_) => rendered,
        TypeRef::Named { boxed: true, .. } => rendered,
        _ if optional => format!("*{rendered}"),
        _ => rendered,
    }
}

/// Render a type reference; nested structs close at `indent`.
pub fn type_ref(ty: &TypeRef, indent: usize) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Int => "int64".to_string(),
        TypeRef::Float => "float64".to_string(),
        TypeRef::Boolean => "bool".to_string(),
        TypeRef::Named { name, boxed: true } => format!("*{name}"),
        TypeRef::Named { name, boxed: false } => name.clone(),
        TypeRef::Array(inner) => format!("[]{}", type_ref(inner, indent)),
        TypeRef::Inline(fields) if fields.is_empty() => "struct{}".to_string(),
        TypeRef::Inline(fields) => struct_type(fields, indent),
    }
}

/// Render a validator expression; nested objects close at `indent`.
fn validator(expr: &ValidatorExpr, indent: usize) -> String {
    let mut out = match &expr.base {
        ValidatorBase::Scalar(p) => format!("V.{}()", scalar_constructor(*p)),
        ValidatorBase::Ref(name) => format!("lazyType({})", string_literal(name)),
        ValidatorBase::Array(element) => format!("V.Array({})", validator(element, indent)),
        ValidatorBase::Object(fields) if fields.is_empty() => "V.Object()".to_string(),
        ValidatorBase::Object(fields) => {
            let pad = "\t".repeat(indent + 1);
            let mut out = "V.Object(\n".to_string();
            for (name, field) in fields {
                out.push_str(&format!(
                    "{pad}prop({}, {}),\n",
                    string_literal(name),
                    validator(field, indent + 1)
                ));
            }
            out.push_str(&"\t".repeat(indent));
            out.push(')');
            out
        }
    };
    for call in &expr.calls {
        out.push_str(&rule_call(call));
    }
    out
}

fn scalar_constructor(p: Primitive) -> &'static str {
    match p {
        Primitive::String => "String",
        Primitive::Int => "Int",
        Primitive::Float => "Float",
        Primitive::Boolean => "Boolean",
    }
}

fn method_name(rule: &RuleKind) -> &'static str {
    match rule {
        RuleKind::Required => "Required",
        RuleKind::Regex { .. } => "Regex",
        RuleKind::Equals { .. } => "Equals",
        RuleKind::Contains { .. } => "Contains",
        RuleKind::Length { .. } => "Length",
        RuleKind::MinLength { .. } => "MinLength",
        RuleKind::MaxLength { .. } => "MaxLength",
        RuleKind::Min { .. } => "Min",
        RuleKind::Max { .. } => "Max",
        RuleKind::Enum { .. } => "Enum",
        RuleKind::Email => "Email",
        RuleKind::Iso8601 => "Iso8601",
        RuleKind::Uuid => "UUID",
        RuleKind::Json => "JSON",
        RuleKind::Lowercase => "Lowercase",
        RuleKind::Uppercase => "Uppercase",
    }
}

fn string_literal(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn scalar(value: &Scalar) -> String {
    value.to_json().to_string()
}

fn rule_call(call: &Call) -> String {
    let mut args = match &call.rule {
        RuleKind::Regex { value } | RuleKind::Contains { value } => vec![string_literal(value)],
        RuleKind::Equals { value } => vec![scalar(value)],
        RuleKind::Length { value }
        | RuleKind::MinLength { value }
        | RuleKind::MaxLength { value } => vec![value.to_string()],
        RuleKind::Min { value } | RuleKind::Max { value } => vec![value.to_string()],
        RuleKind::Enum { value } => {
            let items: Vec<String> = value.iter().map(scalar).collect();
            vec![format!("[]any{{{}}}", items.join(", "))]
        }
        RuleKind::Required
        | RuleKind::Email
        | RuleKind::Iso8601
        | RuleKind::Uuid
        | RuleKind::Json
        | RuleKind::Lowercase
        | RuleKind::Uppercase => Vec::new(),
    };
    if let Some(message) = &call.message {
        args.push(string_literal(message));
    }
    format!(".{}({})", method_name(&call.rule), args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: TypeRef, optional: bool) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            ty,
            optional,
            doc: None,
        }
    }

    #[test]
    fn package_names_are_identifiers() {
        assert!(is_package_name("rpc"));
        assert!(is_package_name("api_v2"));
        assert!(!is_package_name("2fast"));
        assert!(!is_package_name("my-api"));
        assert!(!is_package_name("func"));
        assert!(!is_package_name(""));
    }

    #[test]
    fn imports_follow_included_runtime() {
        assert_eq!(imports(&[Runtime::Core]), ["errors"]);
        let all = imports(&[
            Runtime::Core,
            Runtime::Validation,
            Runtime::Server,
            Runtime::Client,
            Runtime::DefaultTransport,
        ]);
        assert_eq!(all.len(), STD_PACKAGES.len());
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(all, sorted);
    }

    #[test]
    fn field_names_are_exported_and_unique() {
        assert_eq!(exported_name("user_id"), "UserId");
        assert_eq!(exported_name("id"), "Id");
        assert_eq!(exported_name("_"), "Field");
        let fields = [
            field("a_b", TypeRef::String, false),
            field("aB", TypeRef::String, false),
            field("AB", TypeRef::String, false),
        ];
        assert_eq!(exported_names(&fields), ["AB", "AB2", "AB3"]);
    }

    #[test]
    fn optional_fields_are_pointers_except_slices() {
        insta::assert_snapshot!(field_type(&TypeRef::Int, true, 0), @"*int64");
        insta::assert_snapshot!(
            field_type(&TypeRef::Array(Box::new(TypeRef::String)), true, 0),
            @"[]string"
        );
        let boxed = TypeRef::Named { name: "Node".into(), boxed: true };
        insta::assert_snapshot!(field_type(&boxed, false, 0), @"*Node");
    }

    #[test]
    fn inline_structs_nest_with_tabs() {
        let ty = TypeRef::Inline(vec![
            field("x", TypeRef::Float, false),
            field("note", TypeRef::String, true),
        ]);
        assert_eq!(
            struct_type(&[field("point", ty, true)], 0),
            "struct {\n\tPoint *struct {\n\t\tX float64 `json:\"x\"`\n\t\tNote *string `json:\"note,omitempty\"`\n\t} `json:\"point,omitempty\"`\n}"
        );
    }

    #[test]
    fn rule_calls_use_go_method_names() {
        let call = Call {
            rule: RuleKind::Enum {
                value: vec![Scalar::String("a".into()), Scalar::Number(serde_json::Number::from(1u64))],
            },
            message: Some("pick one".into()),
        };
        insta::assert_snapshot!(rule_call(&call), @r#".Enum([]any{"a", 1}, "pick one")"#);
        let call = Call {
            rule: RuleKind::Uuid,
            message: None,
        };
        insta::assert_snapshot!(rule_call(&call), @".UUID()");
    }
}
