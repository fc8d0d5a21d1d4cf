//! Runtime validation of JSON values.
//!
//! This is the Rust rendition of the validation library that generated
//! TypeScript and Go code embeds: the same shapes, constraints, default
//! messages and evaluation order. Validators can be written by hand with
//! the builders in [`validator`], or compiled from a schema with
//! [`SchemaValidators`].
//!
//! ```
//! use rpcgen_validate::{Constrain, Validator};
//! use serde_json::json;
//!
//! let user = Validator::object()
//!     .field("email", Validator::string().email().required())
//!     .field("age", Validator::int().min(0.0));
//! let user = Validator::from(user);
//!
//! assert!(user.validate(Some(&json!({ "email": "ada@example.com" }))).is_ok());
//! assert_eq!(
//!     user.validate(Some(&json!({ "email": "ada" }))).unwrap_err().to_string(),
//!     "Invalid email format"
//! );
//! ```

pub mod compile;
pub mod error;
pub mod formats;
mod rules;
pub mod validator;

pub use compile::SchemaValidators;
pub use error::{Invalid, Outcome};
pub use validator::{
    ArrayValidator, BooleanValidator, Constrain, LazyValidator, NumberValidator, ObjectValidator,
    StringValidator, TypeTag, Validator,
};
