//! Traits for code generation backends.

use crate::error::GenerateError;
use crate::ir::Module;
use crate::options::GenerateOptions;

/// A code generation backend.
///
/// Backends print a lowered [`Module`] as source text for one target
/// language. They never walk the schema themselves.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use rpcgen_codegen::{Backend, GenerateError, GenerateOptions, ir::Module, register_backend};
///
/// struct KotlinBackend;
///
/// impl Backend for KotlinBackend {
///     fn name(&self) -> &'static str { "kotlin" }
///     fn extension(&self) -> &'static str { "kt" }
///     fn render(&self, module: &Module, options: &GenerateOptions) -> Result<String, GenerateError> {
///         /* ... */
///     }
/// }
///
/// // Register before first use
/// static KOTLIN: KotlinBackend = KotlinBackend;
/// register_backend(&KOTLIN);
/// ```
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "typescript", "go").
    fn name(&self) -> &'static str;

    /// Other names this backend answers to.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// File extension for generated code (e.g., "ts", "go").
    fn extension(&self) -> &'static str;

    /// Identifiers the runtime code already declares. A schema type with one
    /// of these names collides with generated code.
    fn reserved_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Print the module.
    fn render(&self, module: &Module, options: &GenerateOptions) -> Result<String, GenerateError>;
}
