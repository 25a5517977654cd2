//! # Dispatcher Module
//!
//! Handler signatures and return-type plumbing.
//!
//! A handler is any `Fn(&Arguments) -> Result<R, HandlerError>` where `R`
//! implements [`Returns`]. At registration the return type is erased into a
//! [`Handler`] that produces a [`Reply`]: the serialized value tagged with
//! its runtime [`TypeId`](std::any::TypeId). The response matcher uses that
//! tag to pick the status code for union returns ([`OneOf2`], [`OneOf3`]),
//! so selection is always by exact type, never by inspecting the payload.

mod core;

pub use core::{erase, Handler, HandlerError, OneOf2, OneOf3, Reply, ResponseModel, Returns};
