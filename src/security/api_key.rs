use super::{AuthOutcome, AuthScheme};
use crate::server::request::RequestView;
use serde_json::{json, Value};

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

impl ApiKeyLocation {
    fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

/// Static API key scheme. Any of the configured keys is accepted.
pub struct ApiKey {
    name: String,
    location: ApiKeyLocation,
    param: String,
    keys: Vec<String>,
}

impl ApiKey {
    pub fn new(
        name: impl Into<String>,
        location: ApiKeyLocation,
        param: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            param: param.into(),
            keys: Vec::new(),
        }
    }

    /// `X-API-Key` header scheme named `apiKeyAuth`.
    pub fn header(key: impl Into<String>) -> Self {
        Self::new("apiKeyAuth", ApiKeyLocation::Header, "X-API-Key").key(key)
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    fn presented<'a>(&self, req: &'a RequestView) -> Option<&'a str> {
        match self.location {
            ApiKeyLocation::Header => req.get_header(&self.param),
            ApiKeyLocation::Query => req.get_query(&self.param),
            ApiKeyLocation::Cookie => req.get_cookie(&self.param),
        }
    }
}

impl AuthScheme for ApiKey {
    fn scheme_name(&self) -> &str {
        &self.name
    }

    fn security_scheme(&self) -> Value {
        json!({ "type": "apiKey", "in": self.location.as_str(), "name": self.param })
    }

    fn authenticate(&self, req: &RequestView, _scopes: &[String]) -> AuthOutcome {
        match self.presented(req) {
            Some(key) if self.keys.iter().any(|k| k == key) => AuthOutcome::Authenticated(None),
            _ => AuthOutcome::Unauthorized,
        }
    }
}
