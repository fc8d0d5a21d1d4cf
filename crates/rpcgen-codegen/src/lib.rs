//! Client and server generation from rpcgen schemas.
//!
//! `rpcgen-codegen` turns a validated [`Schema`] into one TypeScript or Go
//! source unit holding the protocol types, domain types, endpoint types,
//! runtime validators, a server dispatcher and a typed client.
//!
//! # Architecture
//!
//! ```text
//! Schema ──> lower ──> Module (ir.rs) ──┬─> TypeScript printer ─┐
//!                                       └─> Go printer ─────────┴─> formatter (optional)
//! ```
//!
//! Lowering decides what to emit once for every target; printers only
//! decide how it reads. Runtime code shipped with every unit lives in
//! `templates/` and is embedded verbatim.
//!
//! # Example
//!
//! ```
//! use rpcgen_codegen::{GenerateOptions, Target, generate};
//!
//! let schema = rpcgen_schema::validate_document(&serde_json::json!({
//!     "types": [{ "name": "User", "fields": { "id": "string" } }],
//!     "procedures": [{ "name": "GetUser", "kind": "query", "output": { "user": "User" } }]
//! }))
//! .unwrap();
//!
//! let ts = generate(&schema, Target::TypeScript, &GenerateOptions::default()).unwrap();
//! assert!(ts.contains("export interface User {"));
//! ```
//!
//! # Using the Backend Registry
//!
//! ```ignore
//! use rpcgen_codegen::{backend_names, generate_named};
//!
//! for name in backend_names() {
//!     println!("Backend: {}", name);
//! }
//! let go = generate_named(&schema, "golang", &Default::default())?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod ir;
pub mod lower;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod templates;
pub mod traits;

pub use config::{FormatterCommand, FormatterConfig, GeneratorConfig, OnTimeout};
pub use error::{FormatFailure, FormatterError, GenerateError};
pub use options::GenerateOptions;
pub use pipeline::{Generated, generate_all, generate_formatted};
pub use registry::{backend_names, backends, get_backend, register_backend};
pub use traits::Backend;

use rpcgen_schema::Schema;
use std::fmt;
use std::str::FromStr;

/// A built-in target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    TypeScript,
    Go,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::TypeScript, Target::Go];

    pub fn name(self) -> &'static str {
        self.backend().name()
    }

    pub fn extension(self) -> &'static str {
        self.backend().extension()
    }

    pub fn backend(self) -> &'static dyn Backend {
        match self {
            Target::TypeScript => &output::TYPESCRIPT_BACKEND,
            Target::Go => &output::GO_BACKEND,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = GenerateError;

    /// Accepts names and aliases (`ts`, `golang`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.name() == s || t.backend().aliases().contains(&s))
            .ok_or_else(|| GenerateError::UnsupportedTarget(s.to_string()))
    }
}

/// Generate unformatted source for a built-in target.
///
/// Output is a pure function of the schema and options: the same inputs
/// always produce byte-identical text.
pub fn generate(
    schema: &Schema,
    target: Target,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    render(schema, target.backend(), options)
}

/// Generate unformatted source for any registered backend, by name or alias.
pub fn generate_named(
    schema: &Schema,
    name: &str,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    let backend =
        get_backend(name).ok_or_else(|| GenerateError::UnsupportedTarget(name.to_string()))?;
    render(schema, backend, options)
}

fn render(
    schema: &Schema,
    backend: &dyn Backend,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    warn_collisions(schema, backend);
    let module = lower::lower(schema, options);
    let source = backend.render(&module, options)?;
    tracing::debug!(
        backend = backend.name(),
        blocks = ?module.block_names(),
        bytes = source.len(),
        "generated"
    );
    Ok(source)
}

/// Type names that clash with runtime identifiers or with endpoint types
/// still generate, but the output will not compile.
fn warn_collisions(schema: &Schema, backend: &dyn Backend) {
    let endpoint_names = schema
        .procedures
        .iter()
        .map(|p| &p.name)
        .chain(schema.streams.iter().map(|s| &s.name));
    let derived: Vec<String> = endpoint_names
        .flat_map(|name| ["Input", "Output", "Meta"].map(|suffix| format!("{name}{suffix}")))
        .collect();

    for ty in &schema.types {
        if backend.reserved_names().contains(&ty.name.as_str()) {
            tracing::warn!(
                backend = backend.name(),
                name = %ty.name,
                "type name collides with a runtime declaration"
            );
        }
        if derived.contains(&ty.name) {
            tracing::warn!(
                backend = backend.name(),
                name = %ty.name,
                "type name collides with a generated endpoint type"
            );
        }
    }
}
