//! # Router Module
//!
//! Composable router trees and request matching.
//!
//! ## Overview
//!
//! A [`Router`] collects operations and child routers. Trees are built once
//! during setup and then resolved by [`Router::flatten`] into an ordered list
//! of immutable [`Operation`](crate::operation::Operation)s:
//!
//! - paths are the concatenation of every ancestor prefix plus the
//!   operation's own path, computed at flatten time so a subtree can be
//!   mounted anywhere
//! - auth is inherited from the nearest router with an explicit setting
//! - the order is registration order; matching tries literal segments
//!   before placeholders and falls back to that order
//!
//! ## Architecture
//!
//! 1. **Registration**: [`OperationBuilder::handle`] parses the
//!    [`PathTemplate`], classifies parameters and checks the response table.
//!    Mistakes surface as [`ApiConfigError`](crate::error::ApiConfigError).
//! 2. **Flatten**: cycles are impossible (rejected by
//!    [`Router::add_router`]); duplicate `(method, path)` pairs are rejected.
//! 3. **Matching**: [`RouteTable`] compiles each template into an anchored
//!    regex and reports `405` candidates when only the method differs.
//!
//! ## Example
//!
//! ```rust
//! use oprouter::security::{AuthRequirement, HttpBearer};
//! use oprouter::{ParamSpec, Router};
//!
//! let users = Router::with_prefix("/users")
//!     .unwrap()
//!     .with_auth(AuthRequirement::scheme(HttpBearer::new(|_| None)));
//! users
//!     .get("/<user_id>")
//!     .param(ParamSpec::of::<i64>("user_id"))
//!     .handle(|args| Ok(*args.get::<i64>("user_id")?))
//!     .unwrap();
//!
//! let root = Router::new();
//! root.add_router(&users, "/api").unwrap();
//!
//! let ops = root.flatten().unwrap();
//! assert_eq!(ops[0].path(), "/api/users/<user_id>");
//! assert_eq!(ops[0].auth().scheme_name(), Some("bearerTokenAuth"));
//! ```

mod builder;
mod core;
mod matcher;
pub mod template;

pub use builder::OperationBuilder;
pub use core::Router;
pub use matcher::{RouteLookup, RouteTable};
pub use template::{Converter, PathTemplate, Placeholder};
