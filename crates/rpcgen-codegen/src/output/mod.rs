//! Output backends for code generation.
//!
//! Each backend takes a lowered [`Module`](crate::ir::Module) and prints
//! it. All backends implement the [`Backend`](crate::traits::Backend) trait
//! for uniform access via the registry.

// TypeScript
pub mod typescript;

pub use typescript::{TYPESCRIPT_BACKEND, TypeScriptBackend, TypeScriptWriter};

// Go
pub mod go;

pub use go::{GO_BACKEND, GoBackend, GoWriter};
