//! Route table and dispatch.
//!
//! # Responsibilities
//! - Resolve every registered action's path once, at startup
//! - Reject duplicate method/path pairs and a second home action
//! - Map a request to an action, bind its parameters and run it
//! - Fall back to the not-found and exception actions
//!
//! # Data Flow
//! ```text
//! RouteTable::builder()
//!     .get::<Home>() .post::<Save>() .not_found::<Missing>()
//!     → build()  (PathResolver for each action, conflict checks)
//!     → RouteTable (immutable, shared via Arc)
//!
//! dispatch(request, binder)
//!     → strip context path → lookup(path, method)
//!     → A::default() → binder.bind → perform | invalid
//!     → Outcome
//! ```
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) path lookup via HashMap, then a scan over the few methods of that path
//! - `HEAD` is served by the `GET` action when no `HEAD` action exists
//! - A known path with an unknown method answers `405`, not the not-found action

use axum::http::{Method, StatusCode};
use std::collections::HashMap;
use std::fmt;

use crate::http::request::RequestInfo;
use crate::params::ParameterBinder;
use crate::routing::action::{Action, ActionError, Exchange, Outcome};
use crate::routing::path::PathResolver;
use crate::routing::route::HandlerRef;
use crate::routing::types::RoutingError;

type Runner =
    Box<dyn Fn(&Exchange<'_>, &ParameterBinder) -> Result<Outcome, ActionError> + Send + Sync>;

/// A registered action, type-erased.
struct Endpoint {
    handler: HandlerRef,
    run: Runner,
}

impl Endpoint {
    fn of<A: Action>() -> Self {
        Self {
            handler: HandlerRef::of::<A>(),
            run: Box::new(run_action::<A>),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint").field(&self.handler).finish()
    }
}

fn run_action<A: Action>(
    exchange: &Exchange<'_>,
    binder: &ParameterBinder,
) -> Result<Outcome, ActionError> {
    let mut action = A::default();
    if !binder.bind(&mut action, exchange.request())? {
        tracing::debug!(
            action = std::any::type_name::<A>(),
            path = exchange.route_path(),
            "Required parameters not satisfied"
        );
        return Ok(action.invalid(exchange));
    }
    action.perform(exchange)
}

/// Registers actions for a [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<(Method, Endpoint)>,
    not_found: Option<Endpoint>,
    exception: Option<Endpoint>,
}

impl RouteTableBuilder {
    /// Serve `A` for `method` on its route path.
    pub fn route<A: Action>(mut self, method: Method) -> Self {
        self.routes.push((method, Endpoint::of::<A>()));
        self
    }

    pub fn get<A: Action>(self) -> Self {
        self.route::<A>(Method::GET)
    }

    pub fn post<A: Action>(self) -> Self {
        self.route::<A>(Method::POST)
    }

    /// Action run for paths no route matches. It is rendered with `404`.
    pub fn not_found<A: Action>(mut self) -> Self {
        self.not_found = Some(Endpoint::of::<A>());
        self
    }

    /// Action run when another action fails. It is rendered with `500`.
    pub fn exception<A: Action>(mut self) -> Self {
        self.exception = Some(Endpoint::of::<A>());
        self
    }

    /// Resolve every path and check for conflicts.
    pub fn build(self) -> Result<RouteTable, RoutingError> {
        let mut routes: HashMap<String, Vec<(Method, Endpoint)>> = HashMap::new();
        let mut home: Option<HandlerRef> = None;

        for (method, endpoint) in self.routes {
            let handler = endpoint.handler;
            if handler.is_home() {
                match home {
                    Some(first) if first != handler => {
                        return Err(RoutingError::MultipleHome {
                            first: first.type_name(),
                            second: handler.type_name(),
                        });
                    }
                    _ => home = Some(handler),
                }
            }

            let path = route_key(&PathResolver::resolve(handler)?);
            let entries = routes.entry(path.clone()).or_default();
            if let Some((_, existing)) = entries.iter().find(|(m, _)| *m == method) {
                return Err(RoutingError::DuplicateRoute {
                    method: method.to_string(),
                    path,
                    first: existing.handler.type_name(),
                    second: handler.type_name(),
                });
            }

            tracing::debug!(
                method = %method,
                path = %path,
                action = handler.type_name(),
                "Registered route"
            );
            entries.push((method, endpoint));
        }

        let table = RouteTable {
            routes,
            not_found: self.not_found,
            exception: self.exception,
        };
        tracing::info!(routes = table.len(), "Route table built");
        Ok(table)
    }
}

/// Result of looking up a path and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    /// An action serves this path and method.
    Found(HandlerRef),
    /// The path exists but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Immutable mapping from (method, path) to actions.
#[derive(Debug)]
pub struct RouteTable {
    routes: HashMap<String, Vec<(Method, Endpoint)>>,
    not_found: Option<Endpoint>,
    exception: Option<Endpoint>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Number of (method, path) registrations.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Find the action for a route path (context path already removed).
    pub fn lookup(&self, path: &str, method: &Method) -> RouteMatch {
        match self.endpoint(path, method) {
            Ok(endpoint) => RouteMatch::Found(endpoint.handler),
            Err(miss) => miss,
        }
    }

    /// Route path of the action that serves `request`, if one does.
    pub fn matched_route(&self, request: &dyn RequestInfo) -> Option<String> {
        let path = strip_context(request.path(), request.context_path())?;
        matches!(self.lookup(&path, request.method()), RouteMatch::Found(_)).then_some(path)
    }

    fn endpoint(&self, path: &str, method: &Method) -> Result<&Endpoint, RouteMatch> {
        let entries = self.routes.get(path).ok_or(RouteMatch::NotFound)?;
        let find = |wanted: &Method| {
            entries
                .iter()
                .find(|(m, _)| m == wanted)
                .map(|(_, endpoint)| endpoint)
        };
        find(method)
            .or_else(|| (*method == Method::HEAD).then(|| find(&Method::GET)).flatten())
            .ok_or(RouteMatch::MethodNotAllowed)
    }

    /// Run the action for `request`.
    ///
    /// Never fails: unmatched paths go to the not-found action (or `404`), and
    /// action failures go to the exception action (or `500`).
    pub fn dispatch(&self, request: &dyn RequestInfo, binder: &ParameterBinder) -> Outcome {
        let route_path = match strip_context(request.path(), request.context_path()) {
            Some(path) => path,
            None => return self.handle_not_found(request, request.path(), binder),
        };

        let endpoint = match self.endpoint(&route_path, request.method()) {
            Ok(endpoint) => endpoint,
            Err(RouteMatch::MethodNotAllowed) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %route_path,
                    "Method not allowed"
                );
                return Outcome::Status(StatusCode::METHOD_NOT_ALLOWED);
            }
            Err(_) => return self.handle_not_found(request, &route_path, binder),
        };

        let exchange = Exchange::new(request, route_path.as_str());
        match (endpoint.run)(&exchange, binder) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    action = endpoint.handler.type_name(),
                    path = %route_path,
                    error = %e,
                    "Action failed"
                );
                self.handle_exception(request, &route_path, &e, binder)
            }
        }
    }

    fn handle_not_found(
        &self,
        request: &dyn RequestInfo,
        path: &str,
        binder: &ParameterBinder,
    ) -> Outcome {
        tracing::debug!(path = %path, "No route matched");
        let Some(endpoint) = &self.not_found else {
            return Outcome::Status(StatusCode::NOT_FOUND);
        };

        let exchange = Exchange::new(request, path);
        match (endpoint.run)(&exchange, binder) {
            Ok(outcome) => outcome.with_status(StatusCode::NOT_FOUND),
            Err(e) => {
                tracing::error!(error = %e, "Not-found action failed");
                self.handle_exception(request, path, &e, binder)
            }
        }
    }

    fn handle_exception(
        &self,
        request: &dyn RequestInfo,
        path: &str,
        failure: &ActionError,
        binder: &ParameterBinder,
    ) -> Outcome {
        let Some(endpoint) = &self.exception else {
            return Outcome::Status(StatusCode::INTERNAL_SERVER_ERROR);
        };

        let exchange = Exchange::new(request, path).with_failure(failure.to_string());
        match (endpoint.run)(&exchange, binder) {
            Ok(outcome) => outcome.with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(e) => {
                tracing::error!(error = %e, "Exception action failed");
                Outcome::Status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// The part of `path` below `context_path`, or `None` when `path` lies outside it.
fn strip_context(path: &str, context_path: &str) -> Option<String> {
    let rest = if context_path.is_empty() {
        path
    } else {
        let rest = path.strip_prefix(context_path)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        rest
    };
    Some(route_key(rest))
}

/// `path` with one leading slash and no trailing slash; the root stays `/`.
fn route_key(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
