use http::Method;
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum number of headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Path parameters captured by the route matcher.
///
/// Names are `Arc<str>` because they come from the immutable route table and
/// are shared by every request matching that route.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Header pairs with lowercase names.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A request as the transport hands it over.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    /// Path plus optional query string, e.g. `/items/42?lang=fr`.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body and set `content-type: application/json`.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.header("content-type", "application/json").body(bytes))
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("/")
    }

    pub fn query_string(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }
}

/// Parse a query string into ordered, possibly repeated pairs.
pub fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Extract cookies from a raw `Cookie` header value.
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Normalized, read-only view of one request after routing.
///
/// Everything the binder and the auth schemes read comes from here.
#[derive(Debug, Clone)]
pub struct RequestView {
    pub method: Method,
    pub path: String,
    /// Template of the matched route, when routed.
    pub template: Option<Arc<str>>,
    pub path_params: ParamVec,
    pub query: Vec<(String, String)>,
    pub headers: HeaderVec,
    pub cookies: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RequestView {
    /// Build a view from a raw request and the parameters captured by the matcher.
    pub fn from_raw(raw: RawRequest, template: Option<Arc<str>>, path_params: ParamVec) -> Self {
        let path = raw.path().to_string();
        let query = raw.query_string().map(parse_query_pairs).unwrap_or_default();
        let headers: HeaderVec = raw
            .headers
            .into_iter()
            .map(|(k, v)| (Arc::from(k.to_ascii_lowercase()), v))
            .collect();
        let cookies = headers
            .iter()
            .filter(|(k, _)| k.as_ref() == "cookie")
            .flat_map(|(_, v)| parse_cookies(v))
            .collect();
        Self {
            method: raw.method,
            path,
            template,
            path_params,
            query,
            headers,
            cookies,
            body: raw.body,
        }
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value for a query key.
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for a repeated query key, in request order.
    pub fn get_query_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }
}
