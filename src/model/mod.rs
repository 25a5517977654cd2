//! # Model Module
//!
//! Type descriptions for everything that crosses the HTTP boundary.
//!
//! Handlers do not get reflected on at runtime. Instead every parameter,
//! body, and response type implements [`ApiModel`], which returns a
//! [`TypeDescriptor`] describing its structure. Descriptors drive three
//! things:
//!
//! - **Classification** ([`classify`]) decides whether a type is scalar
//!   (bool, integer, number, string, enum) or complex (object, list,
//!   mapping, tuple). The binder infers a parameter's source from this.
//! - **Coercion** ([`coerce_scalar`], [`coerce_list`], [`check_value`])
//!   turns raw request strings into JSON values and reports field-level
//!   failures.
//! - **Schema synthesis** (see [`crate::openapi`]) renders descriptors as
//!   JSON Schema for the OpenAPI document.
//!
//! Records and fieldless enums get `ApiModel` through `#[derive(ApiModel)]`.

mod classify;
mod coerce;
mod core;

pub use classify::{classify, classify_descriptor};
pub use coerce::{check_value, coerce_list, coerce_scalar, Violation};
pub use core::{ApiModel, FieldDescriptor, Kind, ScalarType, Shape, TypeDescriptor};
