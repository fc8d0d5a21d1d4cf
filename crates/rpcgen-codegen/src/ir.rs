//! Target-neutral description of one generated source unit.
//!
//! [`lower`](crate::lower::lower) derives a [`Module`] from a schema once;
//! each backend only decides how to print it.

use rpcgen_schema::{HttpMethod, Primitive, RuleKind, Scalar};

/// A generated source unit: blocks in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub blocks: Vec<Block>,
}

impl Module {
    pub fn has_runtime(&self, runtime: Runtime) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b, Block::Runtime(r) if *r == runtime))
    }

    /// Short block names, for logging.
    pub fn block_names(&self) -> Vec<&'static str> {
        self.blocks.iter().map(Block::name).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Fixed code shipped with every unit that needs it.
    Runtime(Runtime),
    /// One record per declared type.
    Types(Vec<Record>),
    /// Input, output and meta types per endpoint, plus the aggregate tables.
    Endpoints(Vec<Endpoint>),
    Validation(Validation),
    Server(Service),
    Client(Service),
}

impl Block {
    pub fn name(&self) -> &'static str {
        match self {
            Block::Runtime(r) => r.name(),
            Block::Types(_) => "types",
            Block::Endpoints(_) => "endpoints",
            Block::Validation(_) => "validation",
            Block::Server(_) => "server",
            Block::Client(_) => "client",
        }
    }
}

/// Fixed runtime code, one template per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Runtime {
    /// HTTP methods, response envelope, declared error type.
    Core,
    /// The runtime validation library.
    Validation,
    /// Dispatcher and middleware.
    Server,
    /// Call sites, middleware, transport interface, stream reconnection.
    Client,
    /// fetch / net/http transport.
    DefaultTransport,
}

impl Runtime {
    pub fn name(self) -> &'static str {
        match self {
            Runtime::Core => "runtime:core",
            Runtime::Validation => "runtime:validation",
            Runtime::Server => "runtime:server",
            Runtime::Client => "runtime:client",
            Runtime::DefaultTransport => "runtime:transport",
        }
    }
}

/// A named record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    String,
    Int,
    Float,
    Boolean,
    /// A declared type. `boxed` is set when holding it by value would make
    /// the enclosing record contain itself.
    Named { name: String, boxed: bool },
    Array(Box<TypeRef>),
    /// Anonymous record.
    Inline(Vec<FieldDecl>),
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::String => TypeRef::String,
            Primitive::Int => TypeRef::Int,
            Primitive::Float => TypeRef::Float,
            Primitive::Boolean => TypeRef::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Query,
    Mutation,
    Stream,
}

impl EndpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Query => "query",
            EndpointKind::Mutation => "mutation",
            EndpointKind::Stream => "stream",
        }
    }
}

/// A procedure or stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: String,
    pub kind: EndpointKind,
    pub method: HttpMethod,
    pub doc: Option<String>,
    /// `None` for a unit input.
    pub input: Option<Vec<FieldDecl>>,
    /// `None` for a unit output.
    pub output: Option<Vec<FieldDecl>>,
    pub meta: Vec<(String, Scalar)>,
}

impl Endpoint {
    pub fn input_type(&self) -> String {
        format!("{}Input", self.name)
    }

    pub fn output_type(&self) -> String {
        format!("{}Output", self.name)
    }

    pub fn meta_type(&self) -> String {
        format!("{}Meta", self.name)
    }

    pub fn is_stream(&self) -> bool {
        self.kind == EndpointKind::Stream
    }
}

/// Validators for every type and every endpoint input.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub types: Vec<(String, ValidatorExpr)>,
    pub inputs: Vec<(String, ValidatorExpr)>,
}

/// A validator construction: a base followed by builder calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorExpr {
    pub base: ValidatorBase,
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorBase {
    Scalar(Primitive),
    /// Lazy lookup of a declared type's validator.
    Ref(String),
    Array(Box<ValidatorExpr>),
    Object(Vec<(String, ValidatorExpr)>),
}

/// One builder call, named after the schema rule it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub rule: RuleKind,
    pub message: Option<String>,
}

/// Server or client scaffolding for the schema's endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Validate inputs against the validation block before use.
    pub validate: bool,
    /// Client only: a default transport is generated.
    pub default_transport: bool,
    pub endpoints: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub method: HttpMethod,
    pub stream: bool,
    pub doc: Option<String>,
    pub has_input: bool,
}
