//! # Security Module
//!
//! Authentication schemes and the rules that decide which one applies to an
//! operation.
//!
//! ## Overview
//!
//! An [`AuthScheme`] knows two things: how to describe itself in the
//! document's `securitySchemes`, and how to authenticate a request. Bundled
//! schemes:
//!
//! - [`HttpBearer`] - `Authorization: Bearer <token>` checked by a verifier closure
//! - [`BearerJwt`] - signed `header.payload.signature` tokens with scope checks
//! - [`ApiKey`] - static keys from a header, query parameter, or cookie
//!
//! ## Requirements and Settings
//!
//! The API root, every router, and every operation carry an [`AuthSetting`]:
//! either `Unset` or an explicit [`AuthRequirement`]. An explicit
//! [`AuthRequirement::None`] is a real setting, distinct from `Unset`; it lets
//! a sub-router opt out of a policy set above it. [`resolve`] applies the
//! nearest-explicit-wins rule.
//!
//! ## Outcome
//!
//! Authentication runs before binding. A rejected request never reaches the
//! binder or the handler:
//!
//! 1. [`AuthOutcome::Unauthorized`] → `401`
//! 2. [`AuthOutcome::Forbidden`] → `403`
//! 3. [`AuthOutcome::Authenticated`] → claims handed to the handler via
//!    [`Arguments::claims`](crate::params::Arguments::claims)
//!
//! ## Example
//!
//! ```rust
//! use oprouter::security::{AuthRequirement, HttpBearer};
//!
//! let bearer = HttpBearer::new(|token| (token == "secret").then(|| serde_json::json!({"sub": "dev"})));
//! let auth = AuthRequirement::scheme(bearer);
//! assert_eq!(auth.scheme_name(), Some("bearerTokenAuth"));
//! ```

use crate::server::request::RequestView;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

mod api_key;
mod bearer_jwt;
mod http_bearer;
mod resolver;

pub use api_key::{ApiKey, ApiKeyLocation};
pub use bearer_jwt::BearerJwt;
pub use http_bearer::HttpBearer;
pub use resolver::resolve;

/// Result of authenticating one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials accepted; optional claims for the handler.
    Authenticated(Option<Value>),
    /// Credentials missing or invalid.
    Unauthorized,
    /// Credentials valid but lacking the required scopes.
    Forbidden,
}

/// An authentication scheme that can verify requests and describe itself.
pub trait AuthScheme: Send + Sync {
    /// Key used under `components.securitySchemes` and in security requirements.
    fn scheme_name(&self) -> &str;

    /// Security scheme object for the document.
    fn security_scheme(&self) -> Value;

    /// Verify the request. `scopes` are the scopes the operation requires.
    fn authenticate(&self, req: &RequestView, scopes: &[String]) -> AuthOutcome;
}

/// Effective authentication requirement of an operation.
#[derive(Clone, Default)]
pub enum AuthRequirement {
    /// No authentication.
    #[default]
    None,
    Scheme {
        scheme: Arc<dyn AuthScheme>,
        scopes: Vec<String>,
    },
}

impl AuthRequirement {
    pub fn scheme<S: AuthScheme + 'static>(scheme: S) -> Self {
        AuthRequirement::Scheme {
            scheme: Arc::new(scheme),
            scopes: Vec::new(),
        }
    }

    pub fn shared(scheme: Arc<dyn AuthScheme>) -> Self {
        AuthRequirement::Scheme {
            scheme,
            scopes: Vec::new(),
        }
    }

    /// Require `scopes` in addition to valid credentials. No effect on `None`.
    pub fn with_scopes<I, S>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            AuthRequirement::None => AuthRequirement::None,
            AuthRequirement::Scheme { scheme, .. } => AuthRequirement::Scheme {
                scheme,
                scopes: scopes.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AuthRequirement::None)
    }

    pub fn scheme_name(&self) -> Option<&str> {
        match self {
            AuthRequirement::None => None,
            AuthRequirement::Scheme { scheme, .. } => Some(scheme.scheme_name()),
        }
    }

    pub fn scopes(&self) -> &[String] {
        match self {
            AuthRequirement::None => &[],
            AuthRequirement::Scheme { scopes, .. } => scopes,
        }
    }

    /// Run the scheme, or admit the request when there is none.
    pub fn authenticate(&self, req: &RequestView) -> AuthOutcome {
        match self {
            AuthRequirement::None => AuthOutcome::Authenticated(None),
            AuthRequirement::Scheme { scheme, scopes } => scheme.authenticate(req, scopes),
        }
    }
}

impl fmt::Debug for AuthRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRequirement::None => f.write_str("None"),
            AuthRequirement::Scheme { scheme, scopes } => f
                .debug_struct("Scheme")
                .field("name", &scheme.scheme_name())
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// Two requirements are equal when they name the same scheme and scopes.
impl PartialEq for AuthRequirement {
    fn eq(&self, other: &Self) -> bool {
        self.scheme_name() == other.scheme_name() && self.scopes() == other.scopes()
    }
}

/// Auth as configured on a root, router, or operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthSetting {
    /// Inherit from the nearest ancestor with an explicit setting.
    #[default]
    Unset,
    Explicit(AuthRequirement),
}

impl AuthSetting {
    /// Explicitly disable authentication.
    pub fn none() -> Self {
        AuthSetting::Explicit(AuthRequirement::None)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, AuthSetting::Explicit(_))
    }
}

impl From<AuthRequirement> for AuthSetting {
    fn from(requirement: AuthRequirement) -> Self {
        AuthSetting::Explicit(requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_scopes_on_none_is_noop() {
        assert!(AuthRequirement::None.with_scopes(["read"]).is_none());
    }

    #[test]
    fn test_equality_by_name_and_scopes() {
        let a = AuthRequirement::scheme(HttpBearer::new(|_| None)).with_scopes(["read"]);
        let b = AuthRequirement::scheme(HttpBearer::new(|_| Some(Value::Null))).with_scopes(["read"]);
        assert_eq!(a, b);
        assert_ne!(a, AuthRequirement::None);
    }

    #[test]
    fn test_setting_from_requirement() {
        let s: AuthSetting = AuthRequirement::None.into();
        assert!(s.is_set());
        assert!(!AuthSetting::Unset.is_set());
    }
}
