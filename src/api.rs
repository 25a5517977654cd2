use crate::config::ApiConfig;
use crate::error::ApiConfigError;
use crate::openapi::{synthesize, DocumentMeta, OpenApiDocument};
use crate::operation::Operation;
use crate::router::{OperationBuilder, Router};
use crate::security::AuthSetting;
use crate::server::ApiService;
use tracing::info;

/// Root of an API: configuration plus the root [`Router`].
///
/// ```rust
/// use oprouter::{Api, ApiConfig, ParamSpec, RawRequest};
///
/// let mut config = ApiConfig::new("Items", "1.0.0");
/// config.prefix = "/api".into();
/// let api = Api::new(config);
/// api.get("/items/<item_id>")
///     .param(ParamSpec::of::<i64>("item_id"))
///     .handle(|args| Ok(*args.get::<i64>("item_id")? * 2))
///     .unwrap();
///
/// let service = api.build().unwrap();
/// let resp = service.handle(RawRequest::get("/api/items/21"));
/// assert_eq!(resp.status, 200);
/// assert_eq!(resp.json_body(), Some(&serde_json::json!(42)));
/// ```
#[derive(Debug)]
pub struct Api {
    config: ApiConfig,
    router: Router,
}

impl Api {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            router: Router::new(),
        }
    }

    /// Auth policy for every operation that does not override it.
    #[must_use]
    pub fn with_auth(self, auth: impl Into<AuthSetting>) -> Self {
        self.router.set_auth(auth);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The root router; operations registered here get the API prefix.
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn get(&self, path: &str) -> OperationBuilder {
        self.router.get(path)
    }

    pub fn post(&self, path: &str) -> OperationBuilder {
        self.router.post(path)
    }

    pub fn put(&self, path: &str) -> OperationBuilder {
        self.router.put(path)
    }

    pub fn patch(&self, path: &str) -> OperationBuilder {
        self.router.patch(path)
    }

    pub fn delete(&self, path: &str) -> OperationBuilder {
        self.router.delete(path)
    }

    pub fn add_router(&self, router: &Router, prefix: &str) -> Result<(), ApiConfigError> {
        self.router.add_router(router, prefix)
    }

    /// Flattened operations with the API prefix applied.
    pub fn operations(&self) -> Result<Vec<Operation>, ApiConfigError> {
        if self.config.prefix.is_empty() {
            return self.router.flatten();
        }
        // The prefix is applied by mounting the root under a throwaway parent,
        // so registration never sees it.
        let top = Router::new();
        top.add_router(&self.router, &self.config.prefix)?;
        top.flatten()
    }

    pub fn openapi(&self) -> Result<OpenApiDocument, ApiConfigError> {
        synthesize(&self.operations()?, &self.meta())
    }

    /// Flatten, synthesize the document once, and compile the route table.
    pub fn build(&self) -> Result<ApiService, ApiConfigError> {
        let operations = self.operations()?;
        let document = synthesize(&operations, &self.meta())?;
        info!(
            title = %self.config.title,
            version = %self.config.version,
            operations = operations.len(),
            "api built"
        );
        ApiService::new(operations, document, &self.config)
    }

    fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            version: self.config.version.clone(),
            servers: self.config.servers.clone(),
        }
    }
}
