use crate::error::UnsupportedTypeError;
use crate::model::{classify, ApiModel, TypeDescriptor};
use serde_json::Value;
use std::any::Any;
use std::fmt;

pub(crate) type BoxedValue = Box<dyn Any + Send + Sync>;
pub(crate) type DecodeFn = fn(Value) -> Result<BoxedValue, serde_json::Error>;

fn decode_as<T: ApiModel>(value: Value) -> Result<BoxedValue, serde_json::Error> {
    serde_json::from_value::<T>(value).map(|v| Box::new(v) as BoxedValue)
}

/// Explicit source marker on a parameter. `Inferred` lets the binder decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMarker {
    Inferred,
    Query,
    Header,
    Body,
}

impl fmt::Display for ParamMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamMarker::Inferred => "Inferred",
            ParamMarker::Query => "Query",
            ParamMarker::Header => "Header",
            ParamMarker::Body => "Body",
        };
        f.write_str(s)
    }
}

/// Typed description of one handler parameter.
///
/// This is the registration-time stand-in for a function signature: a list
/// of `ParamSpec` values names each argument, carries its type, and
/// optionally pins its source.
///
/// ```rust
/// use oprouter::params::ParamSpec;
///
/// let params = vec![
///     ParamSpec::of::<i64>("item_id"),
///     ParamSpec::of::<String>("lang").default("en"),
///     ParamSpec::of::<String>("x_trace").header(),
/// ];
/// assert_eq!(params[2].wire_name(), "x-trace");
/// ```
#[derive(Clone)]
pub struct ParamSpec {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) marker: ParamMarker,
    pub(crate) descriptor: Result<TypeDescriptor, UnsupportedTypeError>,
    pub(crate) type_name: &'static str,
    pub(crate) decode: DecodeFn,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("marker", &self.marker)
            .field("type", &self.type_name)
            .field("default", &self.default)
            .finish()
    }
}

impl ParamSpec {
    /// Declare a parameter named `name` of type `T`.
    pub fn of<T: ApiModel>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            marker: ParamMarker::Inferred,
            descriptor: classify::<T>(),
            type_name: std::any::type_name::<T>(),
            decode: decode_as::<T>,
            default: None,
            description: None,
        }
    }

    /// Read from a header. The wire name swaps `_` for `-` unless aliased.
    pub fn header(mut self) -> Self {
        self.marker = ParamMarker::Header;
        self
    }

    /// Read from the query string. Needed for list-of-scalar parameters,
    /// which would otherwise be inferred as a body.
    pub fn query(mut self) -> Self {
        self.marker = ParamMarker::Query;
        self
    }

    pub fn body(mut self) -> Self {
        self.marker = ParamMarker::Body;
        self
    }

    /// Value used when the parameter is absent. Makes the parameter optional.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Name the value carries on the wire, if different from the argument name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn marker(&self) -> ParamMarker {
        self.marker
    }

    pub fn wire_name(&self) -> String {
        match (&self.alias, self.marker) {
            (Some(alias), _) => alias.clone(),
            (None, ParamMarker::Header) => self.name.replace('_', "-"),
            (None, _) => self.name.clone(),
        }
    }
}
