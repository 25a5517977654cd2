use crate::error::InternalConfigError;
use crate::model::{ApiModel, TypeDescriptor};
use crate::params::Arguments;
use serde_json::Value;
use std::any::TypeId;
use std::sync::Arc;

/// A response model declared for an operation.
#[derive(Debug, Clone)]
pub struct ResponseModel {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub descriptor: TypeDescriptor,
    /// Plain strings are sent as `text/plain`.
    pub is_text: bool,
}

impl ResponseModel {
    pub fn of<T: ApiModel>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            descriptor: T::describe(),
            is_text: TypeId::of::<T>() == TypeId::of::<String>(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        if self.is_text {
            "text/plain"
        } else {
            "application/json"
        }
    }
}

/// A handler's return value, serialized and tagged with its runtime type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub payload: Value,
}

impl Reply {
    pub fn from_model<T: ApiModel>(value: &T) -> Result<Self, InternalConfigError> {
        let payload =
            serde_json::to_value(value).map_err(|e| InternalConfigError::Serialization {
                type_name: std::any::type_name::<T>().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            payload,
        })
    }
}

/// Return type of a handler.
///
/// Every [`ApiModel`] is a single-model return. Handlers that answer with
/// one of several models return [`OneOf2`] or [`OneOf3`] and declare a
/// status code per member.
pub trait Returns: Send + 'static {
    /// Members of the return type, in declaration order.
    fn models() -> Vec<ResponseModel>;

    fn is_union() -> bool {
        false
    }

    fn into_reply(self) -> Result<Reply, InternalConfigError>;
}

impl<T: ApiModel> Returns for T {
    fn models() -> Vec<ResponseModel> {
        vec![ResponseModel::of::<T>()]
    }

    fn into_reply(self) -> Result<Reply, InternalConfigError> {
        Reply::from_model(&self)
    }
}

/// Union of two response models.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOf2<A, B> {
    A(A),
    B(B),
}

impl<A: ApiModel, B: ApiModel> Returns for OneOf2<A, B> {
    fn models() -> Vec<ResponseModel> {
        vec![ResponseModel::of::<A>(), ResponseModel::of::<B>()]
    }

    fn is_union() -> bool {
        true
    }

    fn into_reply(self) -> Result<Reply, InternalConfigError> {
        match self {
            OneOf2::A(a) => Reply::from_model(&a),
            OneOf2::B(b) => Reply::from_model(&b),
        }
    }
}

/// Union of three response models.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOf3<A, B, C> {
    A(A),
    B(B),
    C(C),
}

impl<A: ApiModel, B: ApiModel, C: ApiModel> Returns for OneOf3<A, B, C> {
    fn models() -> Vec<ResponseModel> {
        vec![
            ResponseModel::of::<A>(),
            ResponseModel::of::<B>(),
            ResponseModel::of::<C>(),
        ]
    }

    fn is_union() -> bool {
        true
    }

    fn into_reply(self) -> Result<Reply, InternalConfigError> {
        match self {
            OneOf3::A(a) => Reply::from_model(&a),
            OneOf3::B(b) => Reply::from_model(&b),
            OneOf3::C(c) => Reply::from_model(&c),
        }
    }
}

/// Failure reported by a handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Deliberate error response, e.g. `404` for a missing record.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Internal(#[from] InternalConfigError),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl HandlerError {
    /// Codes outside `100..=599` are answered with `500`.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        HandlerError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(404, message)
    }
}

/// Type-erased handler stored on an operation.
pub type Handler = Arc<dyn Fn(&Arguments) -> Result<Reply, HandlerError> + Send + Sync>;

/// Erase the return type of `f` behind [`Returns::into_reply`].
pub fn erase<R, F>(f: F) -> Handler
where
    R: Returns,
    F: Fn(&Arguments) -> Result<R, HandlerError> + Send + Sync + 'static,
{
    Arc::new(move |args: &Arguments| -> Result<Reply, HandlerError> {
        Ok(f(args)?.into_reply()?)
    })
}
