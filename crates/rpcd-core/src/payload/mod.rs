//! Request validation and response construction shared by every handler.

pub mod builder;
pub mod policy;

pub use builder::{BuilderError, ResponseBuilder};
pub use policy::{validate, Args, FieldKind, FieldSpec, ValidationError};
