use super::core::Router;
use super::template::PathTemplate;
use crate::dispatcher::{erase, HandlerError, ResponseModel, Returns};
use crate::error::ApiConfigError;
use crate::model::ApiModel;
use crate::operation::{CallbackDescriptor, DocRecord, OperationDef, OperationDocs, ResponseContract};
use crate::params::{Arguments, Binder, ParamSpec};
use crate::security::{AuthRequirement, AuthSetting};
use http::Method;

/// Describes one operation; [`OperationBuilder::handle`] validates and
/// registers it.
///
/// ```rust
/// use oprouter::{ParamSpec, Router};
///
/// let router = Router::new();
/// router
///     .get("/items/<item_id>")
///     .param(ParamSpec::of::<i64>("item_id"))
///     .param(ParamSpec::of::<String>("lang").default("en"))
///     .summary("Read an item")
///     .handle(|args| Ok(*args.get::<i64>("item_id")?))
///     .unwrap();
/// assert_eq!(router.operation_count(), 1);
/// ```
#[must_use = "the operation is only registered by `handle`"]
pub struct OperationBuilder {
    router: Router,
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
    responses: Vec<(u16, ResponseModel)>,
    auth: AuthSetting,
    docs: OperationDocs,
    callbacks: Vec<CallbackDescriptor>,
}

impl OperationBuilder {
    pub(crate) fn new(router: Router, method: Method, path: &str) -> Self {
        Self {
            router,
            method,
            path: path.to_string(),
            params: Vec::new(),
            responses: Vec::new(),
            auth: AuthSetting::Unset,
            docs: OperationDocs::default(),
            callbacks: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn params(mut self, specs: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(specs);
        self
    }

    /// Declare that `status` answers with a `T`.
    pub fn response<T: ApiModel>(mut self, status: u16) -> Self {
        self.responses.push((status, ResponseModel::of::<T>()));
        self
    }

    pub fn auth(mut self, requirement: AuthRequirement) -> Self {
        self.auth = AuthSetting::Explicit(requirement);
        self
    }

    /// Opt out of any auth policy inherited from routers above.
    pub fn no_auth(mut self) -> Self {
        self.auth = AuthSetting::none();
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.docs.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.docs.description = Some(text.into());
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.docs.operation_id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.docs.tags.push(tag.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.docs.deprecated = true;
        self
    }

    /// Attach parsed handler documentation.
    pub fn doc(mut self, record: DocRecord) -> Self {
        self.docs.record = record;
        self
    }

    pub fn callback(mut self, callback: CallbackDescriptor) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Bind `handler` and register the operation on its router.
    ///
    /// Every configuration problem (template, parameter classification,
    /// response table) is reported here, before the API can serve.
    pub fn handle<R, F>(self, handler: F) -> Result<(), ApiConfigError>
    where
        R: Returns,
        F: Fn(&Arguments) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        let template = PathTemplate::parse(&self.path)?;
        let binder = Binder::build(self.params, &template)?;
        let contract = ResponseContract::build::<R>(self.responses)?;
        self.router.push_operation(OperationDef {
            method: self.method,
            template,
            binder,
            contract,
            auth: self.auth,
            docs: self.docs,
            callbacks: self.callbacks,
            handler: erase(handler),
        });
        Ok(())
    }
}
