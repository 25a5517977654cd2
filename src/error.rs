//! # Error Taxonomy
//!
//! Every failure in oprouter lands in exactly one of these classes:
//!
//! | Error | Raised | Surface |
//! |-------|--------|---------|
//! | [`ApiConfigError`] | registration, flatten, synthesis | fatal at startup, never sent to clients |
//! | [`RequestValidationError`] | per request, while binding | `422` with one entry per failing field |
//! | [`InternalConfigError`] | per request, after the handler returns | `500`, logged at `error` |
//! | [`UnsupportedTypeError`] | type classification | wrapped into [`ApiConfigError`] |
//!
//! Authentication failures are not errors in this sense: they are a classified
//! [`AuthOutcome`](crate::security::AuthOutcome) that short-circuits the
//! operation before binding.

use serde::Serialize;
use std::fmt;

/// A declared type that cannot be classified as scalar or complex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported type `{type_name}`: {reason}")]
pub struct UnsupportedTypeError {
    pub type_name: String,
    pub reason: String,
}

impl UnsupportedTypeError {
    pub fn new(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Author mistakes detected while building the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiConfigError {
    #[error("invalid path template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid router prefix `{prefix}`: {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    #[error("path parameter `{name}` must be scalar")]
    NonScalarPathParam { name: String },

    #[error("cannot use `{marker}` for path param `{name}`")]
    PathParamMarker { name: String, marker: String },

    #[error("{source_kind} parameter `{name}` must be a scalar or a list of scalars")]
    NonScalarParam { name: String, source_kind: String },

    #[error("handler is missing a parameter for path placeholder `{name}` in `{template}`")]
    MissingPathParam { name: String, template: String },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParam { name: String },

    #[error("multiple request body parameters: {names:?}")]
    MultipleBodies { names: Vec<String> },

    #[error("default for parameter `{name}` does not decode: {reason}")]
    InvalidDefault { name: String, reason: String },

    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedTypeError),

    #[error("return type not specified: a union return needs an explicit response table")]
    ReturnTypeNotSpecified,

    #[error("response model `{model}` for status {status} is not part of the return type")]
    ResponseModelMismatch { status: u16, model: String },

    #[error("return type member `{model}` has no status code in the response table")]
    UncoveredResponseModel { model: String },

    #[error("return type member `{model}` is declared under more than one status code")]
    AmbiguousResponseModel { model: String },

    #[error("status code {status} is declared more than once")]
    DuplicateStatus { status: u16 },

    #[error("status code {status} is out of range")]
    InvalidStatus { status: u16 },

    #[error("attaching this router would create a cycle")]
    RouterCycle,

    #[error("router is already mounted under `{prefix}` on this parent")]
    RouterAlreadyMounted { prefix: String },

    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: String, path: String },

    #[error("failed to compile route `{path}`: {reason}")]
    RouteCompile { path: String, reason: String },

    #[error("failed to build documentation page: {0}")]
    Docs(String),
}

/// Where in the request a parameter value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Path,
    Query,
    Header,
    Body,
}

impl ParamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSource::Path => "path",
            ParamSource::Query => "query",
            ParamSource::Header => "header",
            ParamSource::Body => "body",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single field failed to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    /// A required value was absent.
    Missing,
    /// A raw value could not be converted to the declared type.
    TypeCoercion,
    /// A string did not name one of the enum's variants.
    UnknownVariant,
    /// The request body was not valid JSON.
    InvalidJson,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorReason::Missing => "missing",
            ErrorReason::TypeCoercion => "type_coercion",
            ErrorReason::UnknownVariant => "unknown_variant",
            ErrorReason::InvalidJson => "invalid_json",
        };
        f.write_str(s)
    }
}

/// One failing field inside a [`RequestValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Handler parameter name.
    pub parameter: String,
    pub source: ParamSource,
    /// Dotted location inside a structured value, e.g. `tags.1` or `owner.name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: ErrorReason,
    pub message: String,
}

impl FieldError {
    pub fn new(
        parameter: impl Into<String>,
        source: ParamSource,
        reason: ErrorReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            source,
            field: None,
            reason,
            message: message.into(),
        }
    }

    pub fn at(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !field.is_empty() {
            self.field = Some(field);
        }
        self
    }
}

/// Client supplied malformed, missing, or mistyped data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request validation failed on {} field(s)", errors.len())]
pub struct RequestValidationError {
    pub errors: Vec<FieldError>,
}

impl RequestValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// First error reported for `parameter`, if any.
    pub fn for_parameter(&self, parameter: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.parameter == parameter)
    }
}

/// A handler produced a value inconsistent with its declared contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalConfigError {
    #[error("returned value `{type_name}` does not match any declared response model")]
    UnmatchedResponse { type_name: String },

    #[error("failed to serialize `{type_name}`: {reason}")]
    Serialization { type_name: String, reason: String },

    #[error("response for status {status} violates its schema: {reason}")]
    ResponseSchema { status: u16, reason: String },

    #[error("argument `{name}` is not bound for this operation")]
    UnknownArgument { name: String },

    #[error("argument `{name}` was requested as `{requested}` but is bound as `{bound}`")]
    ArgumentType {
        name: String,
        requested: &'static str,
        bound: &'static str,
    },
}
