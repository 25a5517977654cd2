use super::{AuthOutcome, AuthScheme};
use crate::server::request::RequestView;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

type Verifier = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// HTTP bearer authentication with a caller-supplied token verifier.
///
/// The token is read from `Authorization: Bearer <token>`; the prefix is
/// matched case-insensitively. The verifier returns the claims for a valid
/// token, or `None` to reject it with `401`.
#[derive(Clone)]
pub struct HttpBearer {
    name: String,
    verifier: Verifier,
}

impl HttpBearer {
    pub fn new<F>(verifier: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: "bearerTokenAuth".to_string(),
            verifier: Arc::new(verifier),
        }
    }

    /// Override the scheme name used in the document.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn extract_token(req: &RequestView) -> Option<&str> {
        let header = req.get_header("authorization")?;
        let (prefix, token) = header.trim().split_once(' ')?;
        if !prefix.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }
}

impl AuthScheme for HttpBearer {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn security_scheme(&self) -> Value {
        json!({ "type": "http", "scheme": "bearer" })
    }

    fn authenticate(&self, req: &RequestView, _scopes: &[String]) -> AuthOutcome {
        let Some(token) = Self::extract_token(req) else {
            debug!(scheme = %self.name, "bearer token missing or malformed");
            return AuthOutcome::Unauthorized;
        };
        match (self.verifier)(token) {
            Some(claims) => AuthOutcome::Authenticated(Some(claims)),
            None => {
                debug!(scheme = %self.name, "bearer token rejected by verifier");
                AuthOutcome::Unauthorized
            }
        }
    }
}
