use super::builder::OperationBuilder;
use super::template::{join_paths, normalize_prefix, PathTemplate};
use crate::error::ApiConfigError;
use crate::operation::{Operation, OperationDef};
use crate::security::{resolve, AuthSetting};
use http::Method;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[derive(Clone)]
enum Entry {
    Operation(Arc<OperationDef>),
    Mount { child: Router, prefix: String },
}

struct RouterNode {
    prefix: String,
    auth: AuthSetting,
    /// Operations and mounted children, interleaved in registration order.
    entries: Vec<Entry>,
}

/// Composable collection of operations and child routers.
///
/// `Router` is a cheap handle: clones share the same node, which is how a
/// child stays mountable after it has been attached. Registration only
/// validates against the router's own templates; prefixes and auth are
/// resolved by [`Router::flatten`].
#[derive(Clone)]
pub struct Router {
    inner: Arc<RwLock<RouterNode>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.read();
        f.debug_struct("Router")
            .field("prefix", &node.prefix)
            .field("auth", &node.auth)
            .field("entries", &node.entries.len())
            .finish()
    }
}

impl Router {
    /// Router without a prefix or auth setting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RouterNode {
                prefix: String::new(),
                auth: AuthSetting::Unset,
                entries: Vec::new(),
            })),
        }
    }

    /// Router whose operations all live under `prefix`.
    ///
    /// Prefixes are static: they must start with `/` and cannot contain
    /// placeholders.
    pub fn with_prefix(prefix: &str) -> Result<Self, ApiConfigError> {
        let router = Self::new();
        router.write().prefix = normalize_prefix(prefix)?;
        Ok(router)
    }

    /// Set this router's auth policy, inherited by everything below it.
    #[must_use]
    pub fn with_auth(self, auth: impl Into<AuthSetting>) -> Self {
        self.set_auth(auth);
        self
    }

    pub fn set_auth(&self, auth: impl Into<AuthSetting>) {
        self.write().auth = auth.into();
    }

    pub fn prefix(&self) -> String {
        self.read().prefix.clone()
    }

    pub fn auth(&self) -> AuthSetting {
        self.read().auth.clone()
    }

    /// Number of operations registered directly on this router.
    pub fn operation_count(&self) -> usize {
        self.read()
            .entries
            .iter()
            .filter(|e| matches!(e, Entry::Operation(_)))
            .count()
    }

    /// Start describing an operation at `path`, relative to this router.
    pub fn add_operation(&self, method: Method, path: &str) -> OperationBuilder {
        OperationBuilder::new(self.clone(), method, path)
    }

    pub fn get(&self, path: &str) -> OperationBuilder {
        self.add_operation(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> OperationBuilder {
        self.add_operation(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> OperationBuilder {
        self.add_operation(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> OperationBuilder {
        self.add_operation(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> OperationBuilder {
        self.add_operation(Method::DELETE, path)
    }

    pub(crate) fn push_operation(&self, def: OperationDef) {
        debug!(
            method = %def.method,
            path = %def.template.raw(),
            params = def.binder.bindings().len(),
            "operation registered"
        );
        self.write().entries.push(Entry::Operation(Arc::new(def)));
    }

    /// Mount `child` under `prefix`.
    ///
    /// Fails when the edge would make a router its own ancestor, or when the
    /// same child is already mounted here under the same prefix.
    pub fn add_router(&self, child: &Router, prefix: &str) -> Result<(), ApiConfigError> {
        let prefix = normalize_prefix(prefix)?;
        if Arc::ptr_eq(&self.inner, &child.inner) || child.reaches(self) {
            return Err(ApiConfigError::RouterCycle);
        }
        let mut node = self.write();
        let already = node.entries.iter().any(|e| match e {
            Entry::Mount { child: c, prefix: p } => Arc::ptr_eq(&c.inner, &child.inner) && *p == prefix,
            Entry::Operation(_) => false,
        });
        if already {
            return Err(ApiConfigError::RouterAlreadyMounted { prefix });
        }
        debug!(prefix = %prefix, "router mounted");
        node.entries.push(Entry::Mount {
            child: child.clone(),
            prefix,
        });
        Ok(())
    }

    /// Whether `target` is this router or one of its descendants.
    fn reaches(&self, target: &Router) -> bool {
        if Arc::ptr_eq(&self.inner, &target.inner) {
            return true;
        }
        let children: Vec<Router> = self
            .read()
            .entries
            .iter()
            .filter_map(|e| match e {
                Entry::Mount { child, .. } => Some(child.clone()),
                Entry::Operation(_) => None,
            })
            .collect();
        children.iter().any(|c| c.reaches(target))
    }

    /// Resolve the tree into its final operations.
    ///
    /// Depth-first in registration order. Each path is the concatenation of
    /// every ancestor prefix (mount prefix, then the router's own prefix)
    /// followed by the operation path; auth is the nearest explicit setting.
    /// Two operations with the same method and path shape are rejected.
    pub fn flatten(&self) -> Result<Vec<Operation>, ApiConfigError> {
        let mut out = Vec::new();
        let mut chain = Vec::new();
        self.collect("", &mut chain, &mut out)?;

        let mut seen = HashSet::with_capacity(out.len());
        for op in &out {
            if !seen.insert((op.method().clone(), op.template().shape())) {
                return Err(ApiConfigError::DuplicateRoute {
                    method: op.method().to_string(),
                    path: op.path().to_string(),
                });
            }
        }
        info!(operations = out.len(), "router tree flattened");
        Ok(out)
    }

    fn collect(
        &self,
        base: &str,
        chain: &mut Vec<AuthSetting>,
        out: &mut Vec<Operation>,
    ) -> Result<(), ApiConfigError> {
        let (prefix, auth, entries) = {
            let node = self.read();
            (node.prefix.clone(), node.auth.clone(), node.entries.clone())
        };
        let base = format!("{base}{prefix}");
        chain.push(auth);

        for entry in entries {
            match entry {
                Entry::Operation(def) => {
                    let path = join_paths(&base, def.template.raw());
                    let template = PathTemplate::parse(&path)?;
                    let auth = resolve(&def.auth, chain.iter().rev());
                    out.push(Operation::new(def, template, auth));
                }
                Entry::Mount { child, prefix } => {
                    child.collect(&format!("{base}{prefix}"), chain, out)?;
                }
            }
        }

        chain.pop();
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RouterNode> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RouterNode> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
