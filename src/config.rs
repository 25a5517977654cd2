//! # API Configuration
//!
//! Root settings of an [`Api`](crate::Api): document metadata, the global
//! path prefix, where the document and docs page are served, and whether
//! responses are checked against their schemas.
//!
//! ## Sources
//!
//! 1. Defaults ([`ApiConfig::default`])
//! 2. A YAML file ([`ApiConfig::from_yaml_file`])
//! 3. Environment overrides ([`ApiConfig::apply_env`])
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `OPROUTER_TITLE` | `title` |
//! | `OPROUTER_VERSION` | `version` |
//! | `OPROUTER_PREFIX` | `prefix` |
//! | `OPROUTER_DOCS_URL` | `docs_url` (`off` or empty disables the page) |
//! | `OPROUTER_VALIDATE_RESPONSES` | `validate_responses` (`1`, `true`, `yes`) |
//!
//! ## Example
//!
//! ```yaml
//! title: Pet Store
//! version: 2.0.0
//! prefix: /api
//! docs_url: /docs
//! servers:
//!   - url: https://pets.example.com
//! ```

use crate::openapi::Server;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration of an API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    pub servers: Vec<Server>,
    /// Prepended to every route, the document, and the docs page.
    pub prefix: String,
    /// Swagger UI location relative to `prefix`; `None` disables it.
    pub docs_url: Option<String>,
    /// Document location relative to `prefix`.
    pub openapi_url: String,
    /// Validate every serialized response against its declared schema.
    pub validate_responses: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            description: None,
            version: "1.0.0".to_string(),
            servers: Vec::new(),
            prefix: String::new(),
            docs_url: Some("/docs".to_string()),
            openapi_url: "/openapi.json".to_string(),
            validate_responses: false,
        }
    }
}

impl ApiConfig {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid API configuration")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&source).with_context(|| format!("in {}", path.display()))
    }

    /// Apply `OPROUTER_*` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(title) = lookup("OPROUTER_TITLE") {
            self.title = title;
        }
        if let Some(version) = lookup("OPROUTER_VERSION") {
            self.version = version;
        }
        if let Some(prefix) = lookup("OPROUTER_PREFIX") {
            self.prefix = prefix;
        }
        if let Some(docs) = lookup("OPROUTER_DOCS_URL") {
            let docs = docs.trim();
            self.docs_url = match docs {
                "" | "off" | "none" => None,
                url => Some(url.to_string()),
            };
        }
        if let Some(flag) = lookup("OPROUTER_VALIDATE_RESPONSES") {
            self.validate_responses = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        self
    }

    pub fn openapi_path(&self) -> String {
        format!("{}{}", self.prefix, self.openapi_url)
    }

    pub fn docs_path(&self) -> Option<String> {
        self.docs_url
            .as_ref()
            .map(|docs| format!("{}{}", self.prefix, docs))
    }
}
