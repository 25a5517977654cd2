use super::http_bearer::HttpBearer;
use super::{AuthOutcome, AuthScheme};
use crate::server::request::RequestView;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Bearer scheme for `header.payload.signature` tokens with a shared signature.
///
/// The signature segment must equal the configured value. The payload is
/// base64 JSON; its whitespace-separated `scope` claim is checked against
/// the operation's required scopes. Missing scopes yield `403`, every other
/// failure `401`. The decoded payload is passed to the handler as claims.
///
/// Suited to tests and internal services with pre-shared secrets. It does
/// not verify cryptographic signatures.
pub struct BearerJwt {
    name: String,
    signature: String,
    cookie_name: Option<String>,
}

impl BearerJwt {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            name: "bearerAuth".to_string(),
            signature: signature.into(),
            cookie_name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Also accept the token from this cookie.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    fn extract_token<'a>(&self, req: &'a RequestView) -> Option<&'a str> {
        if let Some(token) = self.cookie_name.as_deref().and_then(|c| req.get_cookie(c)) {
            return Some(token);
        }
        HttpBearer::extract_token(req)
    }

    fn decode_claims(&self, token: &str) -> Option<Value> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(sig)) = (parts.next(), parts.next(), parts.next())
        else {
            debug!("jwt rejected: malformed token");
            return None;
        };
        if sig != self.signature {
            debug!("jwt rejected: signature mismatch");
            return None;
        }
        let bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .or_else(|_| general_purpose::STANDARD.decode(payload))
            .map_err(|e| debug!(error = %e, "jwt rejected: payload is not base64"))
            .ok()?;
        serde_json::from_slice(&bytes)
            .map_err(|e| debug!(error = %e, "jwt rejected: payload is not JSON"))
            .ok()
    }
}

impl AuthScheme for BearerJwt {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn security_scheme(&self) -> Value {
        json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" })
    }

    fn authenticate(&self, req: &RequestView, scopes: &[String]) -> AuthOutcome {
        let Some(claims) = self.extract_token(req).and_then(|t| self.decode_claims(t)) else {
            return AuthOutcome::Unauthorized;
        };
        let granted = claims.get("scope").and_then(Value::as_str).unwrap_or("");
        let missing: Vec<&String> = scopes
            .iter()
            .filter(|s| !granted.split_whitespace().any(|g| g == s.as_str()))
            .collect();
        if missing.is_empty() {
            AuthOutcome::Authenticated(Some(claims))
        } else {
            warn!(required = ?scopes, granted = %granted, "jwt missing required scopes");
            AuthOutcome::Forbidden
        }
    }
}
