use super::core::{ApiModel, Kind, Shape, TypeDescriptor};
use crate::error::UnsupportedTypeError;

/// Describe `T` and check that every nested member is representable.
pub fn classify<T: ApiModel>() -> Result<TypeDescriptor, UnsupportedTypeError> {
    let descriptor = T::describe();
    validate(&descriptor, std::any::type_name::<T>())?;
    Ok(descriptor)
}

/// Classification without the type parameter, for descriptors built by hand.
pub fn classify_descriptor(descriptor: &TypeDescriptor) -> Result<Kind, UnsupportedTypeError> {
    validate(descriptor, "<descriptor>")?;
    descriptor
        .kind()
        .ok_or_else(|| UnsupportedTypeError::new("<descriptor>", "no schema representation"))
}

fn validate(descriptor: &TypeDescriptor, type_name: &str) -> Result<(), UnsupportedTypeError> {
    match &descriptor.shape {
        Shape::Unsupported(inner) => Err(UnsupportedTypeError::new(
            type_name,
            format!("`{inner}` is neither scalar nor structured"),
        )),
        Shape::Enum { name, variants } if variants.is_empty() => Err(UnsupportedTypeError::new(
            type_name,
            format!("enum `{name}` has no variants"),
        )),
        Shape::List { item, .. } => validate(item, type_name),
        Shape::Mapping(value) => validate(value, type_name),
        Shape::Tuple(items) => items.iter().try_for_each(|i| validate(i, type_name)),
        Shape::Object { fields, .. } => fields
            .iter()
            .try_for_each(|f| validate(&f.descriptor, type_name)),
        Shape::Scalar(_) | Shape::Enum { .. } | Shape::Any => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_classify_scalars_and_containers() {
        assert_eq!(classify::<i32>().unwrap().kind(), Some(Kind::Scalar));
        assert_eq!(classify::<Vec<String>>().unwrap().kind(), Some(Kind::List));
        assert_eq!(
            classify::<HashMap<String, bool>>().unwrap().kind(),
            Some(Kind::Mapping)
        );
    }

    #[test]
    fn test_nested_unsupported_fails() {
        let err = classify::<Vec<()>>().unwrap_err();
        assert!(err.to_string().contains("unsupported type"));
        assert!(classify::<Option<()>>().is_err());
    }

    #[test]
    fn test_empty_enum_fails() {
        let d = TypeDescriptor::enumeration::<String>("Never", vec![]);
        assert!(classify_descriptor(&d).is_err());
    }
}
