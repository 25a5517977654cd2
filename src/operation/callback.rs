use crate::model::{ApiModel, TypeDescriptor};
use crate::params::ParamSpec;
use http::Method;

/// Out-of-band request the API makes back to a client-supplied URL.
///
/// Only documented; this crate never sends it.
#[derive(Debug, Clone)]
pub struct CallbackDescriptor {
    pub name: String,
    /// Runtime expression or URL template, e.g. `{$request.body#/callback_url}`.
    pub url: String,
    pub method: Method,
    pub request_body: Option<TypeDescriptor>,
    pub params: Vec<ParamSpec>,
    pub response_codes: Vec<(u16, String)>,
}

impl CallbackDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>, method: Method) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method,
            request_body: None,
            params: Vec::new(),
            response_codes: Vec::new(),
        }
    }

    pub fn body<T: ApiModel>(mut self) -> Self {
        self.request_body = Some(T::describe());
        self
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn response(mut self, status: u16, description: impl Into<String>) -> Self {
        self.response_codes.push((status, description.into()));
        self
    }
}
