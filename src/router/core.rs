use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 4;

/// Extracted path parameters, in segment order.
///
/// Names are shared with the route table; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route as registered in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path shape such as `/api/users/{id}`
    pub path_pattern: String,
    /// Name the dispatcher uses to find the handler
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Result of successfully matching a request to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub path_params: ParamVec,
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// If the same name appears twice in a pattern, the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

type CompiledRoute = (Method, Regex, RouteMeta, Vec<Arc<str>>);

/// Ordered first-match route table
#[derive(Clone, Debug)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile a route table. Order is preserved and is the match priority.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern cannot be compiled to a regex.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let routes = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern)?;
                Ok((route.method.clone(), regex, route, param_names))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let routes_summary: Vec<String> = routes
            .iter()
            .map(|(method, _, meta, _)| format!("{} {}", method, meta.path_pattern))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self { routes })
    }

    /// Registered routes in priority order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|(_, _, meta, _)| meta)
    }

    /// Match a request against the table; the first structural match wins.
    ///
    /// `path` must not contain a query string.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        for (route_method, regex, meta, param_names) in &self.routes {
            if route_method != method {
                continue;
            }
            let Some(caps) = regex.captures(path) else {
                continue;
            };
            let path_params: ParamVec = param_names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, cap)| Some((Arc::clone(name), cap?.as_str().to_string())))
                .collect();

            info!(
                method = %method,
                path = %path,
                handler_name = %meta.handler_name,
                route_pattern = %meta.path_pattern,
                path_params = ?path_params,
                duration_us = match_start.elapsed().as_micros(),
                "Route matched"
            );
            return Some(RouteMatch {
                path_params,
                handler_name: meta.handler_name.clone(),
            });
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        None
    }

    /// Convert a path pattern to an anchored regex and its parameter names.
    ///
    /// `{name}` segments match exactly one non-empty segment. `{name*}`
    /// captures the rest of the path after its slash, which may be empty or
    /// span several segments. Every other segment matches literally.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Some(name) => match name.strip_suffix('*') {
                    Some(tail) => {
                        pattern.push_str("/(.*)");
                        param_names.push(Arc::from(tail));
                    }
                    None => {
                        pattern.push_str("/([^/]+)");
                        param_names.push(Arc::from(name));
                    }
                },
                None => {
                    pattern.push('/');
                    pattern.push_str(&regex::escape(segment));
                }
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
