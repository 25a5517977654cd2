//! # Operation Module
//!
//! One handler bound to one `(method, path)` pair.
//!
//! An [`Operation`] is produced by [`Router::flatten`](crate::router::Router::flatten)
//! and owns everything needed to serve and describe it: the parameter
//! [`Binder`](crate::params::Binder), the [`ResponseContract`], the resolved
//! [`AuthRequirement`](crate::security::AuthRequirement), documentation, and
//! callbacks. It is immutable after flattening, so it can be shared across
//! threads without locking.
//!
//! ## Request flow
//!
//! [`Operation::invoke`] runs:
//!
//! 1. authentication (401/403 short-circuit before anything is bound)
//! 2. parameter binding (every failing field reported, 422)
//! 3. the handler
//! 4. response matching by exact runtime type (mismatch is a 500)

mod callback;
mod core;
mod response;

pub use callback::CallbackDescriptor;
pub use core::{
    normalize_description, Dispatched, DocRecord, Operation, OperationDocs, OperationError,
};
pub(crate) use core::OperationDef;
pub use response::{ResponseContract, ResponseEntry};
