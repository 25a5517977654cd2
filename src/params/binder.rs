use super::spec::{BoxedValue, DecodeFn, ParamMarker, ParamSpec};
use crate::error::{
    ApiConfigError, ErrorReason, FieldError, InternalConfigError, ParamSource,
    RequestValidationError,
};
use crate::model::{check_value, coerce_list, coerce_scalar, TypeDescriptor, Violation};
use crate::router::template::{Converter, PathTemplate};
use crate::server::request::{RequestView, MAX_INLINE_PARAMS};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// How one handler parameter is drawn from a request.
#[derive(Clone)]
pub struct ParameterBinding {
    pub name: Arc<str>,
    /// Key looked up in the query string or header map.
    pub wire_name: String,
    pub source: ParamSource,
    pub descriptor: TypeDescriptor,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Converter from the path template, for path parameters only.
    pub converter: Option<Converter>,
    /// Query or header list that collects repeated values.
    pub multi: bool,
    pub(crate) type_name: &'static str,
    pub(crate) decode: DecodeFn,
}

impl std::fmt::Debug for ParameterBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBinding")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("required", &self.required)
            .field("type", &self.type_name)
            .finish()
    }
}

/// Ordered binding rules for one operation.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    bindings: Vec<ParameterBinding>,
}

impl Binder {
    /// Classify every parameter against `template`.
    ///
    /// Rules, per parameter in declaration order:
    ///
    /// 1. a name matching a placeholder binds from the path and must be scalar
    /// 2. a header marker binds from a header
    /// 3. a scalar binds from the query string
    /// 4. anything else is the request body
    ///
    /// Explicit query and body markers override rules 3 and 4. At most one
    /// body is allowed and every placeholder needs a parameter.
    pub fn build(params: Vec<ParamSpec>, template: &PathTemplate) -> Result<Self, ApiConfigError> {
        let mut bindings: Vec<ParameterBinding> = Vec::with_capacity(params.len());

        for spec in params {
            if bindings.iter().any(|b| b.name.as_ref() == spec.name) {
                return Err(ApiConfigError::DuplicateParam { name: spec.name });
            }
            let wire_name = spec.wire_name();
            let descriptor = spec.descriptor?;
            let placeholder = template.placeholder(&spec.name);

            let source = match (placeholder, spec.marker) {
                (Some(_), ParamMarker::Inferred) => ParamSource::Path,
                (Some(_), marker) => {
                    return Err(ApiConfigError::PathParamMarker {
                        name: spec.name,
                        marker: marker.to_string(),
                    })
                }
                (None, ParamMarker::Header) => ParamSource::Header,
                (None, ParamMarker::Query) => ParamSource::Query,
                (None, ParamMarker::Body) => ParamSource::Body,
                (None, ParamMarker::Inferred) if descriptor.is_scalar() => ParamSource::Query,
                (None, ParamMarker::Inferred) => ParamSource::Body,
            };

            let multi = matches!(source, ParamSource::Query | ParamSource::Header)
                && descriptor.scalar_items().is_some();
            match source {
                ParamSource::Path if !descriptor.is_scalar() => {
                    return Err(ApiConfigError::NonScalarPathParam { name: spec.name })
                }
                ParamSource::Query | ParamSource::Header if !descriptor.is_scalar() && !multi => {
                    return Err(ApiConfigError::NonScalarParam {
                        name: spec.name,
                        source_kind: source.to_string(),
                    })
                }
                _ => {}
            }

            if let Some(default) = &spec.default {
                (spec.decode)(default.clone()).map_err(|e| ApiConfigError::InvalidDefault {
                    name: spec.name.clone(),
                    reason: e.to_string(),
                })?;
            }

            let required = match source {
                ParamSource::Path => true,
                _ => spec.default.is_none() && descriptor.required,
            };

            bindings.push(ParameterBinding {
                name: Arc::from(spec.name.as_str()),
                wire_name,
                source,
                required,
                default: spec.default,
                description: spec.description,
                converter: placeholder.and_then(|p| p.converter.clone()),
                multi,
                type_name: spec.type_name,
                decode: spec.decode,
                descriptor,
            });
        }

        let bodies: Vec<String> = bindings
            .iter()
            .filter(|b| b.source == ParamSource::Body)
            .map(|b| b.name.to_string())
            .collect();
        if bodies.len() > 1 {
            return Err(ApiConfigError::MultipleBodies { names: bodies });
        }

        if let Some(missing) = template
            .placeholders()
            .find(|p| !bindings.iter().any(|b| b.name.as_ref() == p.name))
        {
            return Err(ApiConfigError::MissingPathParam {
                name: missing.name.clone(),
                template: template.raw().to_string(),
            });
        }

        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn body(&self) -> Option<&ParameterBinding> {
        self.bindings.iter().find(|b| b.source == ParamSource::Body)
    }

    /// Resolve every binding against `req`.
    ///
    /// All failures are collected; nothing is returned partially bound.
    pub fn bind(&self, req: &RequestView) -> Result<Arguments, RequestValidationError> {
        let mut arguments = Arguments::default();
        let mut errors = Vec::new();

        for binding in &self.bindings {
            let value = match binding.extract(req) {
                Ok(Some(value)) => value,
                Ok(None) => match (&binding.default, binding.required) {
                    (Some(default), _) => default.clone(),
                    (None, false) => Value::Null,
                    (None, true) => {
                        errors.push(binding.error(ErrorReason::Missing, "value required"));
                        continue;
                    }
                },
                Err(violations) => {
                    errors.extend(
                        violations
                            .into_iter()
                            .map(|v| binding.error(v.reason, v.message).at(v.location)),
                    );
                    continue;
                }
            };

            match (binding.decode)(value.clone()) {
                Ok(typed) => arguments.entries.push(BoundArgument {
                    name: Arc::clone(&binding.name),
                    source: binding.source,
                    type_name: binding.type_name,
                    value,
                    typed,
                }),
                Err(e) => errors.push(binding.error(ErrorReason::TypeCoercion, e.to_string())),
            }
        }

        if errors.is_empty() {
            Ok(arguments)
        } else {
            debug!(error_count = errors.len(), "request failed to bind");
            Err(RequestValidationError::new(errors))
        }
    }
}

impl ParameterBinding {
    fn error(&self, reason: ErrorReason, message: impl Into<String>) -> FieldError {
        FieldError::new(self.name.as_ref(), self.source, reason, message)
    }

    /// `Ok(None)` means absent.
    fn extract(&self, req: &RequestView) -> Result<Option<Value>, Vec<Violation>> {
        match self.source {
            ParamSource::Path => req
                .path_param(&self.name)
                .map(|raw| coerce_scalar(raw, &self.descriptor).map_err(|v| vec![v]))
                .transpose(),
            ParamSource::Query if self.multi => {
                let raws: Vec<&str> = req.get_query_all(&self.wire_name).collect();
                if raws.is_empty() {
                    return Ok(None);
                }
                self.coerce_items(raws).map(Some)
            }
            ParamSource::Query => req
                .get_query(&self.wire_name)
                .map(|raw| coerce_scalar(raw, &self.descriptor).map_err(|v| vec![v]))
                .transpose(),
            ParamSource::Header if self.multi => match req.get_header(&self.wire_name) {
                Some(raw) => self
                    .coerce_items(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
                    .map(Some),
                None => Ok(None),
            },
            ParamSource::Header => req
                .get_header(&self.wire_name)
                .map(|raw| coerce_scalar(raw, &self.descriptor).map_err(|v| vec![v]))
                .transpose(),
            ParamSource::Body => {
                if req.body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                let value: Value = serde_json::from_slice(&req.body).map_err(|e| {
                    vec![Violation {
                        location: String::new(),
                        reason: ErrorReason::InvalidJson,
                        message: e.to_string(),
                    }]
                })?;
                let violations = check_value(&value, &self.descriptor);
                if violations.is_empty() {
                    Ok(Some(value))
                } else {
                    Err(violations)
                }
            }
        }
    }

    fn coerce_items<'a, I>(&self, raws: I) -> Result<Value, Vec<Violation>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self.descriptor.scalar_items() {
            Some(item) => coerce_list(raws, item),
            None => Ok(Value::Array(Vec::new())),
        }
    }
}

struct BoundArgument {
    name: Arc<str>,
    source: crate::error::ParamSource,
    type_name: &'static str,
    value: Value,
    typed: BoxedValue,
}

/// Bound, type-checked handler arguments for one request.
#[derive(Default)]
pub struct Arguments {
    entries: SmallVec<[BoundArgument; MAX_INLINE_PARAMS]>,
    claims: Option<Value>,
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (e.name.as_ref(), &e.value)))
            .finish()
    }
}

impl Arguments {
    /// Typed access to a bound argument.
    ///
    /// `T` must be the type the parameter was declared with; anything else is
    /// a programming error and reported as [`InternalConfigError`].
    pub fn get<T: 'static>(&self, name: &str) -> Result<&T, InternalConfigError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name.as_ref() == name)
            .ok_or_else(|| InternalConfigError::UnknownArgument {
                name: name.to_string(),
            })?;
        entry
            .typed
            .downcast_ref::<T>()
            .ok_or_else(|| InternalConfigError::ArgumentType {
                name: name.to_string(),
                requested: std::any::type_name::<T>(),
                bound: entry.type_name,
            })
    }

    /// Coerced JSON value of a bound argument.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name.as_ref() == name)
            .map(|e| &e.value)
    }

    pub fn source(&self, name: &str) -> Option<ParamSource> {
        self.entries
            .iter()
            .find(|e| e.name.as_ref() == name)
            .map(|e| e.source)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All bound values as one JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.name.to_string(), e.value.clone()))
            .collect();
        Value::Object(map)
    }

    /// Data returned by the auth scheme that admitted the request.
    pub fn claims(&self) -> Option<&Value> {
        self.claims.as_ref()
    }

    pub(crate) fn set_claims(&mut self, claims: Option<Value>) {
        self.claims = claims;
    }
}
