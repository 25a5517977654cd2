//! # CLI Module
//!
//! Command-line access to the bundled pet store API.
//!
//! ## Commands
//!
//! ### `openapi`
//!
//! Print the synthesized OpenAPI document:
//!
//! ```bash
//! oprouter openapi --format yaml
//! ```
//!
//! ### `routes`
//!
//! List the flattened operations with their effective auth:
//!
//! ```bash
//! oprouter routes
//! ```
//!
//! ### `call`
//!
//! Dispatch one in-process request and print the response:
//!
//! ```bash
//! oprouter call POST /pets --body '{"name":"Tom","species":"cat"}' \
//!     --header 'Authorization: Bearer demo-token'
//! ```
//!
//! Every command accepts `--config <FILE>` with a YAML [`ApiConfig`](crate::ApiConfig);
//! `OPROUTER_*` environment variables are applied on top.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_cli_with_writer, Cli, Commands, DocFormat};
