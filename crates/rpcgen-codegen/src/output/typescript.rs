//! TypeScript printer.
//!
//! Emits a lowered [`Module`] as one TypeScript source file: runtime
//! templates verbatim, everything schema-derived printed from the IR.

use crate::error::GenerateError;
use crate::ir::{
    Block, Call, Endpoint, FieldDecl, Module, Record, Route, Service, TypeRef, Validation,
    ValidatorBase, ValidatorExpr,
};
use crate::options::GenerateOptions;
use crate::templates;
use crate::traits::Backend;
use rpcgen_schema::{Primitive, RuleKind, Scalar};

/// Static instance of the TypeScript backend for the registry.
pub static TYPESCRIPT_BACKEND: TypeScriptBackend = TypeScriptBackend;

pub struct TypeScriptBackend;

impl Backend for TypeScriptBackend {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ts"]
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        &[
            "AbortSignal",
            "AfterMiddleware",
            "Array",
            "BaseClient",
            "BeforeMiddleware",
            "Check",
            "Client",
            "ClientAfterMiddleware",
            "ClientBeforeMiddleware",
            "ClientOptions",
            "Error",
            "ErrorBody",
            "HandledResponse",
            "Handlers",
            "HttpMethod",
            "OutgoingRequest",
            "ProcedureName",
            "Procedures",
            "Promise",
            "ReconnectOptions",
            "Record",
            "Request",
            "RequestContext",
            "Response",
            "RpcError",
            "RpcResponse",
            "ServerOptions",
            "Set",
            "StreamName",
            "Streams",
            "Transport",
            "TypeTag",
            "URL",
            "ValidationResult",
            "Validator",
            "ValidatorSpec",
        ]
    }

    fn render(&self, module: &Module, _options: &GenerateOptions) -> Result<String, GenerateError> {
        Ok(TypeScriptWriter::emit(module))
    }
}

/// Emits a module as TypeScript source code.
pub struct TypeScriptWriter {
    output: String,
    indent: usize,
}

impl Default for TypeScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a module to TypeScript source.
    pub fn emit(module: &Module) -> String {
        let mut writer = Self::new();
        writer.line("// Code generated by rpcgen. DO NOT EDIT.");
        for block in &module.blocks {
            writer.blank();
            writer.write_block(block);
        }
        writer.output
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("  ");
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
        let doc = doc.replace("*/", "*\\/");
        let lines: Vec<&str> = doc.lines().collect();
        if let [single] = lines.as_slice() {
            self.line(&format!("/** {single} */"));
            return;
        }
        self.line("/**");
        for l in lines {
            self.line(&format!(" * {l}").trim_end().to_string());
        }
        self.line(" */");
    }

    fn write_block(&mut self, block: &Block) {
        match block {
            Block::Runtime(runtime) => {
                self.output.push_str(templates::typescript::runtime(*runtime));
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
        self.write_interface(&record.name, &record.fields);
    }

    fn write_interface(&mut self, name: &str, fields: &[FieldDecl]) {
        if fields.is_empty() {
            self.line(&format!("export type {name} = Record<string, never>;"));
            return;
        }
        self.line(&format!("export interface {name} {{"));
        self.indent += 1;
        for field in fields {
            self.write_doc(field.doc.as_deref());
            let mark = if field.optional { "?" } else { "" };
            self.line(&format!("{}{mark}: {};", field.name, type_ref(&field.ty)));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_unit_or_interface(&mut self, name: &str, fields: Option<&[FieldDecl]>) {
        match fields {
            Some(fields) => self.write_interface(name, fields),
            None => self.line(&format!("export type {name} = void;")),
        }
    }

    fn write_endpoints(&mut self, endpoints: &[Endpoint]) {
        for endpoint in endpoints {
            self.write_unit_or_interface(&endpoint.input_type(), endpoint.input.as_deref());
            self.write_unit_or_interface(&endpoint.output_type(), endpoint.output.as_deref());
            self.write_meta_type(endpoint);
            self.blank();
        }

        let (streams, procedures): (Vec<&Endpoint>, Vec<&Endpoint>) =
            endpoints.iter().partition(|e| e.is_stream());

        self.write_endpoint_map("Procedures", &procedures);
        self.line("export type ProcedureName = keyof Procedures;");
        self.blank();

        self.line("export const procedureMethods: Record<ProcedureName, HttpMethod> = {");
        self.indent += 1;
        for p in &procedures {
            self.line(&format!("{}: \"{}\",", p.name, p.method.as_str()));
        }
        self.indent -= 1;
        self.line("};");
        self.blank();

        self.write_endpoint_map("Streams", &streams);
        self.line("export type StreamName = keyof Streams;");
        self.blank();

        let names: Vec<String> = streams.iter().map(|s| format!("\"{}\"", s.name)).collect();
        self.line(&format!(
            "export const streamNames: ReadonlySet<string> = new Set<string>([{}]);",
            names.join(", ")
        ));
        self.blank();

        self.line("export const procedureMeta = {");
        self.indent += 1;
        for e in endpoints {
            self.line(&format!("{}: {},", e.name, meta_literal(&e.meta)));
        }
        self.indent -= 1;
        self.line("} as const;");
    }

    fn write_meta_type(&mut self, endpoint: &Endpoint) {
        let name = endpoint.meta_type();
        if endpoint.meta.is_empty() {
            self.line(&format!("export type {name} = Record<string, never>;"));
            return;
        }
        self.line(&format!("export interface {name} {{"));
        self.indent += 1;
        for (key, value) in &endpoint.meta {
            self.line(&format!("readonly {key}: {};", scalar(value)));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_endpoint_map(&mut self, name: &str, endpoints: &[&Endpoint]) {
        if endpoints.is_empty() {
            self.line(&format!("export type {name} = Record<never, never>;"));
            return;
        }
        self.line(&format!("export interface {name} {{"));
        self.indent += 1;
        for e in endpoints {
            self.line(&format!(
                "{}: {{ kind: \"{}\"; input: {}; output: {}; meta: {} }};",
                e.name,
                e.kind.as_str(),
                e.input_type(),
                e.output_type(),
                e.meta_type()
            ));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_validation(&mut self, validation: &Validation) {
        self.write_schema_table("typeSchemas", &validation.types);
        self.blank();
        self.write_schema_table("inputSchemas", &validation.inputs);
        self.blank();
        self.line("/** `null` when `input` is valid for the procedure; unknown names pass. */");
        self.line("export function validateInput(procedure: string, input: unknown): string | null {");
        self.indent += 1;
        self.line("const schema = inputSchemas[procedure];");
        self.line("return schema ? schema.validate(input) : null;");
        self.indent -= 1;
        self.line("}");
    }

    fn write_schema_table(&mut self, name: &str, entries: &[(String, ValidatorExpr)]) {
        self.line(&format!("export const {name}: Record<string, Validator> = {{"));
        self.indent += 1;
        for (key, expr) in entries {
            let rendered = validator(expr, self.indent);
            self.line(&format!("{key}: {rendered},"));
        }
        self.indent -= 1;
        self.line("};");
    }

    fn write_server(&mut self, service: &Service) {
        if service.validate {
            self.line("function serverValidate(procedure: string, input: unknown): string | null {");
            self.indent += 1;
            self.line("return validateInput(procedure, input);");
        } else {
            self.line("function serverValidate(_procedure: string, _input: unknown): string | null {");
            self.indent += 1;
            self.line("return null;");
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        self.line("/** One handler per procedure and stream. Throw `RpcError` for a 400. */");
        self.line("export interface Handlers {");
        self.indent += 1;
        for route in &service.endpoints {
            self.write_doc(route.doc.as_deref());
            let (input, output) = route_types(route);
            if route.stream {
                self.line(&format!(
                    "{}(input: {input}, ctx: RequestContext): AsyncIterable<{output}>;",
                    route.name
                ));
            } else {
                self.line(&format!(
                    "{}(input: {input}, ctx: RequestContext): {output} | Promise<{output}>;",
                    route.name
                ));
            }
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_client(&mut self, service: &Service) {
        self.line("function defaultTransport(): Transport | undefined {");
        self.indent += 1;
        if service.default_transport {
            self.line("return fetchTransport();");
        } else {
            self.line("return undefined;");
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        if service.validate {
            self.line("function clientValidate(procedure: string, input: unknown): string | null {");
            self.indent += 1;
            self.line("return validateInput(procedure, input);");
        } else {
            self.line("function clientValidate(_procedure: string, _input: unknown): string | null {");
            self.indent += 1;
            self.line("return null;");
        }
        self.indent -= 1;
        self.line("}");
        self.blank();

        self.line("export class Client extends BaseClient {");
        self.indent += 1;
        for (i, route) in service.endpoints.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.write_client_method(route);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn write_client_method(&mut self, route: &Route) {
        self.write_doc(route.doc.as_deref());
        let method = lower_camel(&route.name);
        let (input, output) = route_types(route);
        let params = if route.has_input {
            format!("input: {input}, signal?: AbortSignal")
        } else {
            "signal?: AbortSignal".to_string()
        };
        let arg = if route.has_input { "input" } else { "undefined" };

        if route.stream {
            self.line(&format!(
                "{method}({params}): AsyncGenerator<RpcResponse<{output}>> {{"
            ));
            self.indent += 1;
            self.line(&format!(
                "return this._stream<{output}>(\"{}\", {arg}, signal);",
                route.name
            ));
        } else {
            self.line(&format!(
                "{method}({params}): Promise<RpcResponse<{output}>> {{"
            ));
            self.indent += 1;
            self.line(&format!(
                "return this._call<{output}>(\"{}\", \"{}\", {arg}, signal);",
                route.name,
                route.method.as_str()
            ));
        }
        self.indent -= 1;
        self.line("}");
    }
}

fn route_types(route: &Route) -> (String, String) {
    (format!("{}Input", route.name), format!("{}Output", route.name))
}

/// Render a type reference inline.
pub fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Int | TypeRef::Float => "number".to_string(),
        TypeRef::Boolean => "boolean".to_string(),
        TypeRef::Named { name, .. } => name.clone(),
        TypeRef::Array(inner) => format!("{}[]", type_ref(inner)),
        TypeRef::Inline(fields) if fields.is_empty() => "Record<string, never>".to_string(),
        TypeRef::Inline(fields) => {
            let members: Vec<String> = fields
                .iter()
                .map(|f| {
                    let mark = if f.optional { "?" } else { "" };
                    format!("{}{mark}: {}", f.name, type_ref(&f.ty))
                })
                .collect();
            format!("{{ {} }}", members.join("; "))
        }
    }
}

/// Render a validator expression. Objects span several lines, indented
/// relative to a line at `indent`.
fn validator(expr: &ValidatorExpr, indent: usize) -> String {
    let mut out = match &expr.base {
        ValidatorBase::Scalar(p) => format!("v.{}()", scalar_constructor(*p)),
        ValidatorBase::Ref(name) => format!("v.lazy(() => typeSchemas[\"{name}\"])"),
        ValidatorBase::Array(element) => format!("v.array({})", validator(element, indent)),
        ValidatorBase::Object(fields) if fields.is_empty() => "v.object({})".to_string(),
        ValidatorBase::Object(fields) => {
            let pad = "  ".repeat(indent + 1);
            let mut out = "v.object({\n".to_string();
            for (name, field) in fields {
                out.push_str(&format!("{pad}{name}: {},\n", validator(field, indent + 1)));
            }
            out.push_str(&"  ".repeat(indent));
            out.push_str("})");
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
        Primitive::String => "string",
        Primitive::Int => "int",
        Primitive::Float => "float",
        Primitive::Boolean => "boolean",
    }
}

fn scalar(value: &Scalar) -> String {
    value.to_json().to_string()
}

fn meta_literal(meta: &[(String, Scalar)]) -> String {
    if meta.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = meta
        .iter()
        .map(|(k, v)| format!("{k}: {}", scalar(v)))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

fn string_literal(s: &str) -> String {
    serde_json::Value::from(s).to_string()
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
            vec![format!("[{}]", items.join(", "))]
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
    format!(".{}({})", call.rule.name(), args.join(", "))
}

/// `GetUser` -> `getUser`.
fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
