//! # oprouter
//!
//! **oprouter** turns typed handler declarations into HTTP operations: it
//! binds request parameters by type, matches handler results to declared
//! response codes, composes routers with prefix and auth inheritance, and
//! synthesizes an [OpenAPI 3.1.0](https://spec.openapis.org/oas/v3.1.0)
//! document from the same declarations that drive dispatch.
//!
//! ## Architecture
//!
//! - **[`model`]** - [`ApiModel`] type descriptors and the type classifier
//! - **[`params`]** - [`ParamSpec`] declarations and the parameter binder
//! - **[`dispatcher`]** - type-erased handlers, [`Returns`], and union results
//! - **[`operation`]** - one bound operation: binder, response contract, auth, docs
//! - **[`router`]** - nestable [`Router`]s, path templates, and the route table
//! - **[`security`]** - auth schemes and inheritance resolution
//! - **[`openapi`]** - schema registry and document synthesis
//! - **[`server`]** - transport-neutral request/response types and [`ApiService`]
//! - **[`config`]**, **[`logging`]**, **[`ids`]** - ambient setup
//! - **[`demo`]** - the pet store used by the `oprouter` binary
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as ApiService
//!     participant Table as RouteTable
//!     participant Op as Operation
//!     participant Auth as AuthRequirement
//!     participant Binder
//!     participant Handler
//!     participant Contract as ResponseContract
//!
//!     Client->>Service: RawRequest
//!     Service->>Table: lookup(method, path)
//!     Table-->>Service: index + path params
//!     Service->>Op: invoke(view)
//!     Op->>Auth: authenticate
//!     Auth-->>Op: claims | 401 | 403
//!     Op->>Binder: bind(view)
//!     Binder-->>Op: Arguments | 422 details
//!     Op->>Handler: call(args)
//!     Handler-->>Op: Reply (tagged with its type)
//!     Op->>Contract: select(reply)
//!     Contract-->>Op: status code
//!     Op-->>Service: Dispatched
//!     Service-->>Client: ResponseDescriptor
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use oprouter::security::{AuthRequirement, HttpBearer};
//! use oprouter::{Api, ApiConfig, ApiModel, OneOf2, ParamSpec, RawRequest, Router};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, ApiModel)]
//! struct Item {
//!     item_id: i64,
//!     lang: String,
//! }
//!
//! #[derive(Serialize, Deserialize, ApiModel)]
//! struct Missing {
//!     message: String,
//! }
//!
//! let items = Router::with_prefix("/items").unwrap();
//! items
//!     .get("/<item_id>")
//!     .param(ParamSpec::of::<i64>("item_id"))
//!     .param(ParamSpec::of::<String>("lang").default("en"))
//!     .response::<Item>(200)
//!     .response::<Missing>(404)
//!     .handle(|args| {
//!         let item_id = *args.get::<i64>("item_id")?;
//!         Ok(if item_id > 0 {
//!             OneOf2::A(Item { item_id, lang: args.get::<String>("lang")?.clone() })
//!         } else {
//!             OneOf2::B(Missing { message: "no such item".into() })
//!         })
//!     })
//!     .unwrap();
//!
//! let api = Api::new(ApiConfig::new("Items", "1.0.0"));
//! api.add_router(&items, "").unwrap();
//! let service = api.build().unwrap();
//!
//! let ok = service.handle(RawRequest::get("/items/42"));
//! assert_eq!(ok.status, 200);
//! assert_eq!(ok.json_body().unwrap()["lang"], "en");
//!
//! let missing = service.handle(RawRequest::get("/items/0"));
//! assert_eq!(missing.status, 404);
//!
//! let invalid = service.handle(RawRequest::get("/items/abc"));
//! assert_eq!(invalid.status, 422);
//! ```
//!
//! ## Registration vs. Request Errors
//!
//! Declaration mistakes (unsupported types, a missing path parameter, an
//! uncovered union member, duplicate routes, router cycles) surface as
//! [`ApiConfigError`] when the operation is registered or the API is built.
//! Request problems never panic: they become `401`/`403`/`404`/`405`/`422`
//! responses, and handler-side contract violations become `500` with an
//! [`InternalConfigError`] logged.
//!
//! ## Logging
//!
//! All events go through `tracing`. The `oprouter` binary installs a
//! subscriber via [`logging::init_logging_with_config`]; library users bring
//! their own.

// Lets `#[derive(ApiModel)]` expand to `::oprouter::...` inside this crate.
extern crate self as oprouter;

mod api;
pub mod cli;
pub mod config;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod openapi;
pub mod operation;
pub mod params;
pub mod router;
pub mod security;
pub mod server;

pub use api::Api;
pub use config::ApiConfig;
pub use dispatcher::{HandlerError, OneOf2, OneOf3, Returns};
pub use error::{
    ApiConfigError, ErrorReason, FieldError, InternalConfigError, ParamSource,
    RequestValidationError, UnsupportedTypeError,
};
pub use model::ApiModel;
pub use openapi::OpenApiDocument;
pub use operation::{CallbackDescriptor, DocRecord, Operation};
pub use oprouter_macros::ApiModel;
pub use params::{Arguments, ParamSpec};
pub use router::Router;
pub use server::{ApiService, RawRequest, ResponseDescriptor};
