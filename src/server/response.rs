use super::request::HeaderVec;
use serde_json::{json, Value};
use std::sync::Arc;

/// Reason phrase for a status code, `"Unknown"` when there is none.
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Response payload handed back to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
}

/// Normalized response: status, headers, body, and content type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: ResponseBody,
    pub content_type: &'static str,
}

impl ResponseDescriptor {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: ResponseBody::Json(body),
            content_type: "application/json",
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: ResponseBody::Text(body.into()),
            content_type: "text/plain",
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: ResponseBody::Text(body.into()),
            content_type: "text/html",
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    /// Build from a dispatched payload; text content is sent unquoted.
    pub fn payload(status: u16, payload: Value, content_type: &'static str) -> Self {
        match (content_type, payload) {
            ("text/plain", Value::String(s)) => Self::text(status, s),
            (_, payload) => Self {
                content_type,
                ..Self::json(status, payload)
            },
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// JSON body, if there is one.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Body bytes as they would go on the wire.
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            ResponseBody::Json(v) => serde_json::to_vec(v).unwrap_or_default(),
            ResponseBody::Text(s) => s.clone().into_bytes(),
            ResponseBody::Bytes(b) => b.clone(),
            ResponseBody::Empty => Vec::new(),
        }
    }

    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }
}
