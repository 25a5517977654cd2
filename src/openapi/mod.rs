//! # OpenAPI Module
//!
//! Synthesis of an OpenAPI 3.1 document from flattened operations.
//!
//! The document is a pure function of the operation list: paths in flatten
//! order, one parameter entry per path/query/header binding, one request body
//! for the body binding, one response per contract entry, and a security
//! requirement for every operation that resolved to an auth scheme.
//!
//! Named models (derived objects and enums) are rendered once under
//! `components/schemas` and referenced elsewhere; two different models that
//! share a name are rejected.

mod document;
pub mod schema;
mod synth;

pub use document::{
    Components, Info, MediaType, OpenApiDocument, OperationObject, ParameterObject, RequestBody,
    ResponseObject, Server, OPENAPI_VERSION,
};
pub use schema::{inline_schema, SchemaRegistry};
pub use synth::{synthesize, DocumentMeta};
