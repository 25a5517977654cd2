use super::docs::render_swagger_ui;
use super::request::{RawRequest, RequestView};
use super::response::ResponseDescriptor;
use crate::config::ApiConfig;
use crate::error::ApiConfigError;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::openapi::OpenApiDocument;
use crate::operation::{Operation, OperationError};
use crate::router::{RouteLookup, RouteTable};
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn};

/// Immutable, shareable request handler built by [`Api::build`](crate::Api::build).
///
/// Holds the flattened operations, their compiled matchers, and the
/// document; nothing is written while serving, so one instance can be used
/// from any number of threads.
pub struct ApiService {
    operations: Vec<Operation>,
    routes: RouteTable,
    document: OpenApiDocument,
    document_json: Value,
    openapi_path: String,
    docs: Option<(String, String)>,
    validate_responses: bool,
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("operations", &self.operations.len())
            .field("openapi_path", &self.openapi_path)
            .field("validate_responses", &self.validate_responses)
            .finish()
    }
}

impl ApiService {
    pub(crate) fn new(
        operations: Vec<Operation>,
        document: OpenApiDocument,
        config: &ApiConfig,
    ) -> Result<Self, ApiConfigError> {
        let routes = RouteTable::new(&operations)?;
        let openapi_path = config.openapi_path();
        let docs = match config.docs_path() {
            Some(path) => Some((path, render_swagger_ui(&config.title, &openapi_path)?)),
            None => None,
        };
        info!(
            routes = routes.len(),
            openapi = %openapi_path,
            docs = ?docs.as_ref().map(|(p, _)| p),
            validate_responses = config.validate_responses,
            "api service ready"
        );
        Ok(Self {
            operations,
            routes,
            document_json: document.to_json(),
            document,
            openapi_path,
            docs,
            validate_responses: config.validate_responses,
        })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    /// Serve one request.
    ///
    /// Every outcome is a response; the returned descriptor always carries
    /// `x-request-id`.
    pub fn handle(&self, raw: RawRequest) -> ResponseDescriptor {
        let inbound = raw
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .map(|(_, v)| v.as_str());
        let request_id = RequestId::from_header_or_new(inbound);
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %raw.method,
            path = %raw.path()
        );
        let _enter = span.enter();
        let start = Instant::now();

        let response = self.dispatch(raw);

        let duration_us = start.elapsed().as_micros() as u64;
        if response.status >= 500 {
            warn!(status = response.status, duration_us, "request failed");
        } else {
            info!(status = response.status, duration_us, "request completed");
        }
        response.with_header(REQUEST_ID_HEADER, request_id.to_string())
    }

    fn dispatch(&self, raw: RawRequest) -> ResponseDescriptor {
        if raw.method == Method::GET {
            if raw.path() == self.openapi_path {
                return ResponseDescriptor::json(200, self.document_json.clone());
            }
            if let Some((path, page)) = &self.docs {
                if raw.path() == path {
                    return ResponseDescriptor::html(200, page.clone());
                }
            }
        }

        match self.routes.lookup(&raw.method, raw.path()) {
            RouteLookup::NotFound => ResponseDescriptor::error(404, "Not Found"),
            RouteLookup::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                ResponseDescriptor::error(405, "Method Not Allowed").with_header("allow", allow)
            }
            RouteLookup::Found { index, params } => {
                let Some(op) = self.operations.get(index) else {
                    error!(index, "route table and operations disagree");
                    return ResponseDescriptor::error(500, "Internal Server Error");
                };
                let view = RequestView::from_raw(raw, Some(Arc::from(op.path())), params);
                match op.invoke(&view, self.validate_responses) {
                    Ok(done) => {
                        ResponseDescriptor::payload(done.status, done.payload, done.content_type)
                    }
                    Err(err) => error_response(op, err),
                }
            }
        }
    }
}

fn error_response(op: &Operation, err: OperationError) -> ResponseDescriptor {
    let status = err.status();
    match err {
        OperationError::Unauthorized => ResponseDescriptor::error(status, "Unauthorized"),
        OperationError::Forbidden => ResponseDescriptor::error(status, "Forbidden"),
        OperationError::Validation(e) => ResponseDescriptor::json(
            status,
            json!({ "error": "Request validation failed", "details": e.errors }),
        ),
        OperationError::Handler { message, .. } if !(100..=599).contains(&status) => {
            error!(method = %op.method(), path = %op.path(), status, message = %message, "handler returned an invalid status code");
            ResponseDescriptor::error(500, "Internal Server Error")
        }
        OperationError::Handler { message, .. } => ResponseDescriptor::error(status, message),
        OperationError::Internal(e) => {
            error!(method = %op.method(), path = %op.path(), error = %e, "handler broke its response contract");
            ResponseDescriptor::error(status, "Internal Server Error")
        }
        OperationError::Failed(e) => {
            error!(method = %op.method(), path = %op.path(), error = ?e, "handler failed");
            ResponseDescriptor::error(status, "Internal Server Error")
        }
    }
}
