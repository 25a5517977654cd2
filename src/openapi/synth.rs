use super::document::{
    Components, Info, MediaType, OpenApiDocument, OperationObject, ParameterObject, RequestBody,
    ResponseObject, Server, OPENAPI_VERSION,
};
use super::schema::{nullable, SchemaRegistry};
use crate::error::{ApiConfigError, ParamSource};
use crate::operation::{normalize_description, CallbackDescriptor, Operation};
use crate::params::{ParamMarker, ParameterBinding};
use crate::security::AuthRequirement;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

/// Root metadata of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    pub servers: Vec<Server>,
}

/// Describe every flattened operation in one OpenAPI document.
///
/// Two operations rendering to the same method and path are an error rather
/// than one silently replacing the other.
pub fn synthesize(
    operations: &[Operation],
    meta: &DocumentMeta,
) -> Result<OpenApiDocument, ApiConfigError> {
    let mut registry = SchemaRegistry::new();
    let mut security_schemes: IndexMap<String, Value> = IndexMap::new();
    let mut paths: IndexMap<String, IndexMap<String, OperationObject>> = IndexMap::new();

    for op in operations {
        let path = op.template().openapi_path();
        let method = op.method().as_str().to_ascii_lowercase();
        if paths.get(&path).is_some_and(|item| item.contains_key(&method)) {
            return Err(ApiConfigError::DuplicateRoute {
                method: op.method().to_string(),
                path,
            });
        }

        let object = describe_operation(op, &mut registry)?;
        if let AuthRequirement::Scheme { scheme, .. } = op.auth() {
            security_schemes
                .entry(scheme.scheme_name().to_string())
                .or_insert_with(|| scheme.security_scheme());
        }
        debug!(method = %method, path = %path, "operation described");
        paths.entry(path).or_default().insert(method, object);
    }

    let components = Components {
        schemas: registry.into_components(),
        security_schemes,
    };
    info!(
        paths = paths.len(),
        schemas = components.schemas.len(),
        security_schemes = components.security_schemes.len(),
        "openapi document synthesized"
    );

    Ok(OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: meta.title.clone(),
            description: meta
                .description
                .as_deref()
                .map(normalize_description)
                .filter(|d| !d.is_empty()),
            version: meta.version.clone(),
        },
        servers: meta.servers.clone(),
        paths,
        components,
    })
}

fn describe_operation(
    op: &Operation,
    registry: &mut SchemaRegistry,
) -> Result<OperationObject, ApiConfigError> {
    let docs = op.docs();

    let mut parameters = Vec::new();
    let mut request_body = None;
    for binding in op.binder().bindings() {
        if binding.source == ParamSource::Body {
            request_body = Some(RequestBody {
                content: json_content(registry.schema_for(&binding.descriptor)),
                required: binding.required,
            });
            continue;
        }
        parameters.push(describe_parameter(binding, docs.param_text(&binding.name), registry));
    }

    let mut responses = IndexMap::new();
    for entry in op.contract().entries() {
        let schema = nullable(
            registry.schema_for(&entry.model.descriptor),
            &entry.model.descriptor,
        );
        let mut content = IndexMap::new();
        content.insert(entry.model.content_type().to_string(), MediaType { schema });
        responses.insert(
            entry.status.to_string(),
            ResponseObject {
                description: entry.description.clone(),
                content,
            },
        );
    }

    let mut callbacks = IndexMap::new();
    for cb in op.callbacks() {
        callbacks.insert(cb.name.clone(), describe_callback(cb, registry)?);
    }

    let security = match op.auth() {
        AuthRequirement::None => None,
        AuthRequirement::Scheme { scheme, scopes } => {
            let mut requirement = IndexMap::new();
            requirement.insert(scheme.scheme_name().to_string(), scopes.clone());
            Some(vec![requirement])
        }
    };

    Ok(OperationObject {
        summary: docs.summary().map(str::to_string),
        description: docs.description(),
        operation_id: docs.operation_id.clone(),
        tags: docs.tags.clone(),
        parameters,
        request_body,
        responses,
        callbacks,
        security,
        deprecated: docs.deprecated,
    })
}

fn describe_parameter(
    binding: &ParameterBinding,
    doc_text: Option<&str>,
    registry: &mut SchemaRegistry,
) -> ParameterObject {
    let mut schema = registry.schema_for(&binding.descriptor);
    if let Value::Object(map) = &mut schema {
        if let Some(converter) = &binding.converter {
            map.extend(converter.schema_hints());
        }
        if let Some(default) = &binding.default {
            map.insert("default".into(), default.clone());
        }
    }
    let name = match binding.source {
        ParamSource::Path => binding.name.to_string(),
        _ => binding.wire_name.clone(),
    };
    ParameterObject {
        name,
        location: binding.source.as_str().to_string(),
        required: binding.required,
        description: binding
            .description
            .clone()
            .or_else(|| doc_text.map(str::to_string)),
        schema,
    }
}

fn describe_callback(
    cb: &CallbackDescriptor,
    registry: &mut SchemaRegistry,
) -> Result<IndexMap<String, IndexMap<String, OperationObject>>, ApiConfigError> {
    let mut parameters = Vec::new();
    for spec in &cb.params {
        let location = match spec.marker() {
            ParamMarker::Body => continue,
            ParamMarker::Header => "header",
            ParamMarker::Query | ParamMarker::Inferred => "query",
        };
        let descriptor = spec.descriptor.clone()?;
        let mut schema = registry.schema_for(&descriptor);
        if let (Value::Object(map), Some(default)) = (&mut schema, &spec.default) {
            map.insert("default".into(), default.clone());
        }
        parameters.push(ParameterObject {
            name: spec.wire_name(),
            location: location.to_string(),
            required: spec.default.is_none() && descriptor.required,
            description: spec.description.clone(),
            schema,
        });
    }

    let request_body = match &cb.request_body {
        Some(descriptor) => Some(RequestBody {
            content: json_content(registry.schema_for(descriptor)),
            required: true,
        }),
        None => None,
    };

    let responses = cb
        .response_codes
        .iter()
        .map(|(code, description)| {
            (
                code.to_string(),
                ResponseObject {
                    description: description.clone(),
                    content: IndexMap::new(),
                },
            )
        })
        .collect();

    let mut by_method = IndexMap::new();
    by_method.insert(
        cb.method.as_str().to_ascii_lowercase(),
        OperationObject {
            parameters,
            request_body,
            responses,
            ..Default::default()
        },
    );
    let mut by_url = IndexMap::new();
    by_url.insert(cb.url.clone(), by_method);
    Ok(by_url)
}

fn json_content(schema: Value) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert("application/json".to_string(), MediaType { schema });
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HandlerError;
    use crate::params::{Arguments, ParamSpec};
    use crate::router::Router;
    use crate::security::{AuthRequirement, HttpBearer};
    use serde_json::json;

    fn ok(_: &Arguments) -> Result<i64, HandlerError> {
        Ok(1)
    }

    fn meta() -> DocumentMeta {
        DocumentMeta {
            title: "Test".into(),
            description: Some("Line one.\n    Line two.".into()),
            version: "0.1.0".into(),
            servers: Vec::new(),
        }
    }

    #[test]
    fn test_parameters_and_security() {
        let root = Router::new().with_auth(AuthRequirement::scheme(HttpBearer::new(|_| None)));
        root.get("/items/<int(min=1):item_id>")
            .param(ParamSpec::of::<i64>("item_id"))
            .param(ParamSpec::of::<String>("lang").default("en"))
            .param(ParamSpec::of::<String>("x_trace").header())
            .handle(ok)
            .unwrap();
        let doc = synthesize(&root.flatten().unwrap(), &meta()).unwrap();

        assert_eq!(doc.info.description.as_deref(), Some("Line one.\nLine two."));
        let op = doc.operation("GET", "/items/{item_id}").unwrap();
        let params = serde_json::to_value(&op.parameters).unwrap();
        assert_eq!(
            params,
            json!([
                {"name": "item_id", "in": "path", "required": true,
                 "schema": {"type": "integer", "minimum": 1}},
                {"name": "lang", "in": "query", "required": false,
                 "schema": {"type": "string", "default": "en"}},
                {"name": "x-trace", "in": "header", "required": true,
                 "schema": {"type": "string"}}
            ])
        );
        assert_eq!(
            serde_json::to_value(&op.security).unwrap(),
            json!([{"bearerTokenAuth": []}])
        );
        assert_eq!(
            doc.components.security_schemes["bearerTokenAuth"],
            json!({"type": "http", "scheme": "bearer"})
        );
    }

    #[test]
    fn test_no_auth_omits_security() {
        let root = Router::new();
        root.get("/ping").handle(ok).unwrap();
        let doc = synthesize(&root.flatten().unwrap(), &meta()).unwrap();
        let json = doc.to_json();
        assert!(json["paths"]["/ping"]["get"].get("security").is_none());
        assert!(json.get("components").is_none());
    }
}
