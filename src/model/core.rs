use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// JSON primitive a scalar maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Boolean,
    Integer,
    Number,
    String,
}

impl ScalarType {
    pub fn json_type(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::String => "string",
        }
    }
}

/// Coarse classification used for binder-source inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    Enum,
    List,
    Mapping,
    Tuple,
    Object,
}

impl Kind {
    /// Scalars and enumerations of scalars bind from raw strings.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Kind::Scalar | Kind::Enum)
    }
}

/// A named member of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

/// Structural shape of a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(ScalarType),
    Enum {
        name: String,
        variants: Vec<String>,
    },
    List {
        item: Box<TypeDescriptor>,
        unique: bool,
    },
    /// String-keyed map.
    Mapping(Box<TypeDescriptor>),
    Tuple(Vec<TypeDescriptor>),
    Object {
        name: String,
        fields: Vec<FieldDescriptor>,
    },
    /// Free-form JSON.
    Any,
    /// Recorded by `describe` for types that have no schema representation.
    Unsupported(String),
}

/// Structural description of a parameter, field, or response type.
///
/// Built once from [`ApiModel::describe`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub shape: Shape,
    /// `false` for `Option<T>` and for fields carrying a serde default.
    pub required: bool,
    /// `null` is a valid value. Only `Option<T>` sets this.
    pub nullable: bool,
    pub default: Option<Value>,
}

impl TypeDescriptor {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            required: true,
            nullable: false,
            default: None,
        }
    }

    pub fn scalar(ty: ScalarType) -> Self {
        Self::new(Shape::Scalar(ty))
    }

    pub fn enumeration<S: Into<String>>(name: impl Into<String>, variants: Vec<S>) -> Self {
        Self::new(Shape::Enum {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        })
    }

    pub fn list(item: TypeDescriptor) -> Self {
        Self::new(Shape::List {
            item: Box::new(item),
            unique: false,
        })
    }

    pub fn set(item: TypeDescriptor) -> Self {
        Self::new(Shape::List {
            item: Box::new(item),
            unique: true,
        })
    }

    pub fn mapping(value: TypeDescriptor) -> Self {
        Self::new(Shape::Mapping(Box::new(value)))
    }

    pub fn tuple(items: Vec<TypeDescriptor>) -> Self {
        Self::new(Shape::Tuple(items))
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(Shape::Object {
            name: name.into(),
            fields,
        })
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::new(Shape::Unsupported(type_name.into()))
    }

    /// May be absent or `null`.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.nullable = true;
        self
    }

    /// May be absent, but `null` is still rejected.
    pub fn defaulted(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    /// `None` only for [`Shape::Unsupported`].
    pub fn kind(&self) -> Option<Kind> {
        match &self.shape {
            Shape::Scalar(_) => Some(Kind::Scalar),
            Shape::Enum { .. } => Some(Kind::Enum),
            Shape::List { .. } => Some(Kind::List),
            Shape::Mapping(_) => Some(Kind::Mapping),
            Shape::Tuple(_) => Some(Kind::Tuple),
            Shape::Object { .. } | Shape::Any => Some(Kind::Object),
            Shape::Unsupported(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.kind().is_some_and(|k| k.is_scalar())
    }

    /// Element descriptor when this is a list whose items are scalar.
    pub fn scalar_items(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            Shape::List { item, .. } if item.is_scalar() => Some(item),
            _ => None,
        }
    }

    /// Name this type contributes when it parameterizes a generic model,
    /// e.g. `Pet` in `PagePet` for `Page<Pet>`.
    pub fn name_fragment(&self) -> String {
        match &self.shape {
            Shape::Object { name, .. } | Shape::Enum { name, .. } => name.clone(),
            Shape::Scalar(ty) => match ty {
                ScalarType::Boolean => "Boolean".to_string(),
                ScalarType::Integer => "Integer".to_string(),
                ScalarType::Number => "Number".to_string(),
                ScalarType::String => "String".to_string(),
            },
            Shape::List { item, .. } => format!("{}List", item.name_fragment()),
            Shape::Mapping(value) => format!("{}Map", value.name_fragment()),
            Shape::Tuple(items) => {
                let parts: String = items.iter().map(TypeDescriptor::name_fragment).collect();
                format!("{parts}Tuple")
            }
            Shape::Any => "Any".to_string(),
            Shape::Unsupported(name) => name.clone(),
        }
    }

    /// Component name for types that are emitted as reusable schemas.
    pub fn component_name(&self) -> Option<&str> {
        match &self.shape {
            Shape::Object { name, .. } | Shape::Enum { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A type that can cross the HTTP boundary as a parameter, body, or response.
///
/// Implemented here for primitives and std containers; derive it for your own
/// records and fieldless enums with `#[derive(ApiModel)]`.
///
/// ```rust
/// use oprouter::model::Kind;
/// use oprouter::ApiModel;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, ApiModel)]
/// struct Pet {
///     name: String,
///     tag: Option<String>,
/// }
///
/// assert_eq!(Pet::describe().kind(), Some(Kind::Object));
/// ```
pub trait ApiModel: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn describe() -> TypeDescriptor;
}

macro_rules! scalar_models {
    ($scalar:expr => $($t:ty),+ $(,)?) => {
        $(
            impl ApiModel for $t {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::scalar($scalar)
                }
            }
        )+
    };
}

scalar_models!(ScalarType::Boolean => bool);
scalar_models!(ScalarType::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
scalar_models!(ScalarType::Number => f32, f64);
scalar_models!(ScalarType::String => String, char);

impl ApiModel for Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(Shape::Any)
    }
}

impl ApiModel for () {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::unsupported("()")
    }
}

impl<T: ApiModel> ApiModel for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe().optional()
    }
}

impl<T: ApiModel> ApiModel for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: ApiModel> ApiModel for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::list(T::describe())
    }
}

impl<T: ApiModel + Eq + Hash> ApiModel for HashSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: ApiModel + Ord> ApiModel for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<V: ApiModel> ApiModel for HashMap<String, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::mapping(V::describe())
    }
}

impl<V: ApiModel> ApiModel for BTreeMap<String, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::mapping(V::describe())
    }
}

macro_rules! tuple_models {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(
            impl<$($name: ApiModel),+> ApiModel for ($($name,)+) {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::tuple(vec![$($name::describe()),+])
                }
            }
        )+
    };
}

tuple_models!((A, B), (A, B, C), (A, B, C, D));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(i64::describe().kind(), Some(Kind::Scalar));
        assert_eq!(bool::describe().kind(), Some(Kind::Scalar));
        assert!(String::describe().is_scalar());
    }

    #[test]
    fn test_option_is_not_required() {
        let d = Option::<i32>::describe();
        assert!(!d.required);
        assert!(d.nullable);
        assert_eq!(d.shape, Shape::Scalar(ScalarType::Integer));
    }

    #[test]
    fn test_defaulted_is_not_nullable() {
        let d = i64::describe().defaulted();
        assert!(!d.required);
        assert!(!d.nullable);
        assert!(Option::<i64>::describe().defaulted().nullable);
    }

    #[test]
    fn test_name_fragments() {
        assert_eq!(i64::describe().name_fragment(), "Integer");
        assert_eq!(Vec::<String>::describe().name_fragment(), "StringList");
        assert_eq!(
            TypeDescriptor::object("Pet", vec![]).name_fragment(),
            "Pet"
        );
    }

    #[test]
    fn test_containers_are_complex() {
        assert_eq!(Vec::<i64>::describe().kind(), Some(Kind::List));
        assert_eq!(
            HashMap::<String, f64>::describe().kind(),
            Some(Kind::Mapping)
        );
        assert_eq!(<(i32, String)>::describe().kind(), Some(Kind::Tuple));
        assert!(Vec::<i64>::describe().scalar_items().is_some());
        assert!(Vec::<Vec<i64>>::describe().scalar_items().is_none());
    }

    #[test]
    fn test_unit_is_unsupported() {
        assert_eq!(<()>::describe().kind(), None);
    }
}
