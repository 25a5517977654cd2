//! Descriptor → JSON Schema rendering.
//!
//! Objects and enums become reusable components referenced with
//! `#/components/schemas/<Name>` when rendered through a [`SchemaRegistry`];
//! [`inline_schema`] expands them in place, which is what the response
//! self-check validates against.
//!
//! Two different shapes under one name (`a::Error` and `b::Error`) get
//! numbered components: `Error`, `Error2`, and so on in registration order.

use crate::model::{Shape, TypeDescriptor};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Collects component schemas while operations are rendered.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    components: IndexMap<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `descriptor`, registering nested objects and enums as components.
    pub fn schema_for(&mut self, descriptor: &TypeDescriptor) -> Value {
        render(descriptor, Some(self))
    }

    pub fn components(&self) -> &IndexMap<String, Value> {
        &self.components
    }

    pub fn into_components(self) -> IndexMap<String, Value> {
        self.components
    }

    fn register(&mut self, name: &str, schema: Value) -> Value {
        let mut key = name.to_string();
        let mut n = 1;
        loop {
            match self.components.get(&key) {
                Some(existing) if *existing == schema => break,
                Some(_) => {
                    n += 1;
                    key = format!("{name}{n}");
                }
                None => {
                    if n > 1 {
                        debug!(name, component = %key, "schema name taken, numbering component");
                    }
                    self.components.insert(key.clone(), schema);
                    break;
                }
            }
        }
        json!({ "$ref": format!("#/components/schemas/{key}") })
    }
}

/// Fully expanded schema with no component references.
pub fn inline_schema(descriptor: &TypeDescriptor) -> Value {
    render(descriptor, None)
}

/// Wrap `schema` so it also admits `null` when the descriptor is nullable.
pub fn nullable(schema: Value, descriptor: &TypeDescriptor) -> Value {
    if descriptor.nullable {
        json!({ "anyOf": [schema, { "type": "null" }] })
    } else {
        schema
    }
}

fn render(descriptor: &TypeDescriptor, mut registry: Option<&mut SchemaRegistry>) -> Value {
    let mut schema = match &descriptor.shape {
        Shape::Scalar(ty) => json!({ "type": ty.json_type() }),
        Shape::Any | Shape::Unsupported(_) => json!({}),
        Shape::Enum { name, variants } => {
            let body = json!({ "title": name, "type": "string", "enum": variants });
            return match registry {
                Some(reg) => reg.register(name, body),
                None => body,
            };
        }
        Shape::List { item, unique } => {
            let mut s = Map::new();
            s.insert("type".into(), json!("array"));
            s.insert("items".into(), render(item, registry.as_deref_mut()));
            if *unique {
                s.insert("uniqueItems".into(), json!(true));
            }
            Value::Object(s)
        }
        Shape::Mapping(value) => json!({
            "type": "object",
            "additionalProperties": render(value, registry.as_deref_mut()),
        }),
        Shape::Tuple(items) => {
            let prefix = items
                .iter()
                .map(|i| render(i, registry.as_deref_mut()))
                .collect::<Vec<_>>();
            json!({
                "type": "array",
                "prefixItems": prefix,
                "minItems": items.len(),
                "maxItems": items.len(),
            })
        }
        Shape::Object { name, fields } => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for field in fields {
                let mut field_schema = render(&field.descriptor, registry.as_deref_mut());
                if let (Some(default), Value::Object(map)) =
                    (&field.descriptor.default, &mut field_schema)
                {
                    map.insert("default".into(), default.clone());
                }
                if field.descriptor.required {
                    required.push(Value::String(field.name.clone()));
                }
                // serde writes `None` as `null`.
                field_schema = nullable(field_schema, &field.descriptor);
                properties.insert(field.name.clone(), field_schema);
            }
            let mut body = Map::new();
            body.insert("title".into(), json!(name));
            body.insert("type".into(), json!("object"));
            body.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                body.insert("required".into(), Value::Array(required));
            }
            let body = Value::Object(body);
            return match registry {
                Some(reg) => reg.register(name, body),
                None => body,
            };
        }
    };
    if let (Some(default), Value::Object(map)) = (&descriptor.default, &mut schema) {
        map.insert("default".into(), default.clone());
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiModel, FieldDescriptor};
    use std::collections::HashMap;

    fn pet() -> TypeDescriptor {
        TypeDescriptor::object(
            "Pet",
            vec![
                FieldDescriptor::new("name", String::describe()),
                FieldDescriptor::new("tag", Option::<String>::describe()),
                FieldDescriptor::new(
                    "kind",
                    TypeDescriptor::enumeration("Kind", vec!["cat", "dog"]),
                ),
            ],
        )
    }

    #[test]
    fn test_scalars() {
        assert_eq!(inline_schema(&i64::describe()), json!({"type": "integer"}));
        assert_eq!(inline_schema(&String::describe()), json!({"type": "string"}));
        assert_eq!(
            inline_schema(&HashMap::<String, f64>::describe()),
            json!({"type": "object", "additionalProperties": {"type": "number"}})
        );
    }

    #[test]
    fn test_object_registers_components() {
        let mut reg = SchemaRegistry::new();
        let schema = reg.schema_for(&TypeDescriptor::list(pet()));
        assert_eq!(
            schema,
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})
        );
        let components = reg.into_components();
        assert_eq!(
            components["Pet"],
            json!({
                "title": "Pet",
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "tag": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                    "kind": {"$ref": "#/components/schemas/Kind"}
                },
                "required": ["name", "kind"]
            })
        );
        assert_eq!(components["Kind"]["enum"], json!(["cat", "dog"]));
    }

    #[test]
    fn test_same_name_different_shape_is_numbered() {
        let mut reg = SchemaRegistry::new();
        assert_eq!(
            reg.schema_for(&pet()),
            json!({"$ref": "#/components/schemas/Pet"})
        );
        let other = TypeDescriptor::object("Pet", vec![]);
        assert_eq!(
            reg.schema_for(&other),
            json!({"$ref": "#/components/schemas/Pet2"})
        );
        // Registering either shape again reuses its component.
        assert_eq!(
            reg.schema_for(&other),
            json!({"$ref": "#/components/schemas/Pet2"})
        );
        assert_eq!(
            reg.schema_for(&pet()),
            json!({"$ref": "#/components/schemas/Pet"})
        );
        let components = reg.into_components();
        assert_eq!(components["Pet2"]["title"], "Pet");
        assert_eq!(components.len(), 3);
    }

    #[test]
    fn test_nullable_response() {
        let d = Option::<i64>::describe();
        assert_eq!(
            nullable(inline_schema(&d), &d),
            json!({"anyOf": [{"type": "integer"}, {"type": "null"}]})
        );
    }
}
