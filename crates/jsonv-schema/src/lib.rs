//! Typed JSON Schema (draft-06/07) tree with a compiler and an async
//! reference resolver.
//!
//! The intended flow: compile a raw document into a [`Schema`], [`resolve`]
//! it once (the only step that may fetch), then validate values against it
//! any number of times.

mod compile;
mod error;
mod pointer;
mod resolve;
mod schema;
mod value;

pub use compile::compile;
pub use error::{SchemaError, SchemaResult};
pub use pointer::SchemaRef;
pub use resolve::{resolve, Fetch};
pub use schema::{
    ArraySchema, BoolOrSchema, Dependency, NumberSchema, ObjectSchema, OneOrMultiSchemas, RefNode,
    Schema, SchemaNode, SchemaType, StringSchema,
};
pub use value::{resolve_kind, ValueKind};
