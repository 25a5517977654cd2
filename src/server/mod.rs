//! # Server Module
//!
//! The boundary with the transport: a normalized request goes in, a
//! normalized response descriptor comes out.
//!
//! - [`request`] - [`RawRequest`] as received and the routed [`RequestView`]
//! - [`response`] - [`ResponseDescriptor`] and status reasons
//! - [`ApiService`] - routing, docs endpoints, and error-to-status mapping
//!
//! HTTP parsing, connections, and TLS belong to whatever server embeds
//! [`ApiService::handle`].

mod docs;
pub mod request;
pub mod response;
mod service;

pub use docs::render_swagger_ui;
pub use request::{RawRequest, RequestView};
pub use response::{status_reason, ResponseBody, ResponseDescriptor};
pub use service::ApiService;
