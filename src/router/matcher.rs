use crate::error::ApiConfigError;
use crate::operation::Operation;
use crate::server::request::ParamVec;
use http::Method;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

struct CompiledRoute {
    method: Method,
    regex: Regex,
    names: Vec<Arc<str>>,
}

/// Outcome of matching a request line against the flattened operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLookup {
    /// Index into the operation list and the decoded placeholder values.
    Found { index: usize, params: ParamVec },
    /// The path exists under other methods only.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Compiled matchers, one per operation.
///
/// Routes are tried most specific first: segment by segment, a literal
/// segment outranks a placeholder, so `/pets/mine` wins over `/pets/{id}`
/// whichever was registered first. Equally specific routes keep flatten
/// order.
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    /// Indices into `routes` in match order.
    order: Vec<usize>,
}

/// One entry per path segment: `0` for literal, `1` for placeholder.
fn specificity(shape: &str) -> Vec<u8> {
    shape
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| u8::from(segment.contains("{}")))
        .collect()
}

impl RouteTable {
    pub fn new(operations: &[Operation]) -> Result<Self, ApiConfigError> {
        let routes = operations
            .iter()
            .map(|op| {
                let (regex, names) = op.template().to_regex()?;
                Ok(CompiledRoute {
                    method: op.method().clone(),
                    regex,
                    names: names.into_iter().map(Arc::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, ApiConfigError>>()?;
        let ranks: Vec<Vec<u8>> = operations
            .iter()
            .map(|op| specificity(&op.template().shape()))
            .collect();
        let mut order: Vec<usize> = (0..routes.len()).collect();
        order.sort_by(|a, b| ranks[*a].cmp(&ranks[*b]));
        Ok(Self { routes, order })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup {
        let mut allowed = Vec::new();
        for &index in &self.order {
            let route = &self.routes[index];
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            if route.method != *method {
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
                continue;
            }
            let params: ParamVec = route
                .names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (Arc::clone(name), decode(m.as_str()))))
                .collect();
            return RouteLookup::Found { index, params };
        }
        debug!(method = %method, path = %path, allowed = ?allowed, "no route matched");
        if allowed.is_empty() {
            RouteLookup::NotFound
        } else {
            RouteLookup::MethodNotAllowed(allowed)
        }
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
