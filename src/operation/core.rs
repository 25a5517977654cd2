use super::callback::CallbackDescriptor;
use super::response::ResponseContract;
use crate::dispatcher::{Handler, HandlerError};
use crate::error::{InternalConfigError, RequestValidationError};
use crate::params::Binder;
use crate::router::template::PathTemplate;
use crate::security::{AuthOutcome, AuthRequirement, AuthSetting};
use crate::server::request::RequestView;
use http::Method;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

static INDENT_AFTER_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]+").expect("static regex compiles"));

/// Strip indentation that follows a line break and trim the ends.
pub fn normalize_description(text: &str) -> String {
    INDENT_AFTER_NEWLINE.replace_all(text.trim(), "\n").into_owned()
}

/// Parsed handler documentation: `{summary, description, per-parameter text}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRecord {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub params: IndexMap<String, String>,
}

impl DocRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.params.insert(name.into(), text.into());
        self
    }
}

/// Documentation attached to one operation.
#[derive(Debug, Clone, Default)]
pub struct OperationDocs {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub record: DocRecord,
}

impl OperationDocs {
    /// Explicit summary, else the record's.
    pub fn summary(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .or(self.record.summary.as_deref())
    }

    /// Explicit description, else the record's, with indentation normalized.
    pub fn description(&self) -> Option<String> {
        self.description
            .as_deref()
            .or(self.record.description.as_deref())
            .map(normalize_description)
            .filter(|d| !d.is_empty())
    }

    pub fn param_text(&self, name: &str) -> Option<&str> {
        self.record.params.get(name).map(String::as_str)
    }
}

/// An operation as registered on a router, before prefixes and auth are
/// resolved.
pub(crate) struct OperationDef {
    pub method: Method,
    pub template: PathTemplate,
    pub binder: Binder,
    pub contract: ResponseContract,
    pub auth: AuthSetting,
    pub docs: OperationDocs,
    pub callbacks: Vec<CallbackDescriptor>,
    pub handler: Handler,
}

/// A flattened operation: final path, final auth, immutable.
#[derive(Clone)]
pub struct Operation {
    pub(crate) def: Arc<OperationDef>,
    template: PathTemplate,
    auth: AuthRequirement,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("method", &self.def.method)
            .field("path", &self.template.raw())
            .field("auth", &self.auth)
            .finish()
    }
}

/// Successful outcome of [`Operation::invoke`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub status: u16,
    pub payload: Value,
    pub content_type: &'static str,
}

/// Every way a single invocation can fail, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("authentication required")]
    Unauthorized,
    #[error("insufficient permissions")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] RequestValidationError),
    #[error(transparent)]
    Internal(#[from] InternalConfigError),
    #[error("{message}")]
    Handler { status: u16, message: String },
    #[error(transparent)]
    Failed(anyhow::Error),
}

impl OperationError {
    pub fn status(&self) -> u16 {
        match self {
            OperationError::Unauthorized => 401,
            OperationError::Forbidden => 403,
            OperationError::Validation(_) => 422,
            OperationError::Internal(_) | OperationError::Failed(_) => 500,
            OperationError::Handler { status, .. } => *status,
        }
    }
}

impl From<HandlerError> for OperationError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Status { status, message } => OperationError::Handler { status, message },
            HandlerError::Internal(e) => OperationError::Internal(e),
            HandlerError::Failed(e) => OperationError::Failed(e),
        }
    }
}

impl Operation {
    pub(crate) fn new(def: Arc<OperationDef>, template: PathTemplate, auth: AuthRequirement) -> Self {
        Self {
            def,
            template,
            auth,
        }
    }

    pub fn method(&self) -> &Method {
        &self.def.method
    }

    /// Resolved path template, prefixes included.
    pub fn path(&self) -> &str {
        self.template.raw()
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn binder(&self) -> &Binder {
        &self.def.binder
    }

    pub fn contract(&self) -> &ResponseContract {
        &self.def.contract
    }

    /// Effective auth after inheritance.
    pub fn auth(&self) -> &AuthRequirement {
        &self.auth
    }

    pub fn docs(&self) -> &OperationDocs {
        &self.def.docs
    }

    pub fn callbacks(&self) -> &[CallbackDescriptor] {
        &self.def.callbacks
    }

    /// Run one request through auth, binding, the handler, and the response
    /// contract.
    ///
    /// With `check_responses` the serialized payload is also validated
    /// against the matched model's schema.
    pub fn invoke(
        &self,
        req: &RequestView,
        check_responses: bool,
    ) -> Result<Dispatched, OperationError> {
        let claims = match self.auth.authenticate(req) {
            AuthOutcome::Authenticated(claims) => claims,
            AuthOutcome::Unauthorized => {
                debug!(method = %self.def.method, path = %self.path(), "request not authenticated");
                return Err(OperationError::Unauthorized);
            }
            AuthOutcome::Forbidden => return Err(OperationError::Forbidden),
        };

        let mut args = self.def.binder.bind(req)?;
        args.set_claims(claims);

        let reply = (self.def.handler)(&args)?;
        let entry = self.def.contract.select(&reply)?;
        if check_responses {
            if let Err(e) = entry.check(&reply.payload) {
                warn!(status = entry.status, error = %e, "response failed self-check");
                return Err(e.into());
            }
        }
        Ok(Dispatched {
            status: entry.status,
            payload: reply.payload,
            content_type: entry.model.content_type(),
        })
    }
}
