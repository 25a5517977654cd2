//! # Parameter Binding
//!
//! Turns a handler's declared parameter list into binding rules and applies
//! them to each request.
//!
//! ## Registration
//!
//! [`Binder::build`] runs once per operation. It decides the source of every
//! [`ParamSpec`] (path, query, header, or body), checks the invariants that
//! make a signature bindable, and reports violations as
//! [`ApiConfigError`](crate::error::ApiConfigError) so a broken API never
//! starts serving.
//!
//! ## Per request
//!
//! [`Binder::bind`] coerces raw strings for path, query, and header
//! parameters, decodes the JSON body, and then decodes each value into its
//! declared Rust type. Failures from every parameter are aggregated into one
//! [`RequestValidationError`](crate::error::RequestValidationError).
//!
//! Absent query and header values fall back to their default. Without a
//! default they are required, unless declared as `Option<T>`.

mod binder;
mod spec;

pub use binder::{Arguments, Binder, ParameterBinding};
pub use spec::{ParamMarker, ParamSpec};
