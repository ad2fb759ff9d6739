//! Actions: the handler types requests are dispatched to.
//!
//! # Responsibilities
//! - Define the `Action` contract (bind, then perform)
//! - Describe what an action produced (`Outcome`)
//! - Give actions read access to the request and a link builder (`Exchange`)
//!
//! # Design Decisions
//! - A fresh action value is created per request from `Default`
//! - Actions never write to the transport; the server renders the `Outcome`

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::link::{LinkBuilder, LinkError};
use crate::http::query::QueryString;
use crate::http::redirect::Redirect;
use crate::http::request::RequestInfo;
use crate::params::{BindError, Bindable};
use crate::routing::route::Routed;
use crate::routing::types::RoutingError;

/// A request handler with route metadata and bindable parameters.
///
/// ```
/// use actionmap::params::{Bindable, Parameter, SchemaBuilder};
/// use actionmap::routing::{Action, ActionError, Exchange, Outcome, Route, Routed};
///
/// #[derive(Default)]
/// struct Hello {
///     name: Option<String>,
/// }
///
/// impl Routed for Hello {
///     fn route() -> Option<Route> {
///         Some(Route::new())
///     }
/// }
///
/// impl Bindable for Hello {
///     fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
///         schema.field(Parameter::field("name"), |h| &mut h.name)
///     }
/// }
///
/// impl Action for Hello {
///     fn perform(&mut self, _exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
///         let name = self.name.as_deref().unwrap_or("world");
///         Ok(Outcome::Text(format!("Hello, {name}")))
///     }
/// }
/// ```
pub trait Action: Routed + Bindable + Default {
    /// Handle the request after parameters were bound successfully.
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError>;

    /// Called instead of `perform` when a required parameter is missing or invalid.
    fn invalid(&mut self, _exchange: &Exchange<'_>) -> Outcome {
        Outcome::Status(StatusCode::BAD_REQUEST)
    }
}

/// The result of running an action.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// `text/plain` body.
    Text(String),
    /// `text/html` body.
    Html(String),
    /// `application/json` body.
    Json(serde_json::Value),
    /// Redirect to another handler or URI.
    Redirect(Redirect),
    /// Empty body with the given status.
    Status(StatusCode),
    /// Another outcome rendered with a different status.
    WithStatus(StatusCode, Box<Outcome>),
}

impl Outcome {
    /// Render `self` with `status` instead of its natural status.
    pub fn with_status(self, status: StatusCode) -> Self {
        match self {
            Outcome::Status(_) => Outcome::Status(status),
            Outcome::WithStatus(_, inner) => Outcome::WithStatus(status, inner),
            other => Outcome::WithStatus(status, Box::new(other)),
        }
    }

    /// The status this outcome is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Text(_) | Outcome::Html(_) | Outcome::Json(_) => StatusCode::OK,
            Outcome::Redirect(redirect) => redirect.status(),
            Outcome::Status(status) | Outcome::WithStatus(status, _) => *status,
        }
    }
}

/// Failures raised while performing an action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Bind(#[from] BindError),

    /// Application-level failure.
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }
}

/// What an action can see of the current request.
pub struct Exchange<'a> {
    request: &'a dyn RequestInfo,
    links: LinkBuilder,
    route_path: String,
    failure: Option<String>,
}

impl<'a> Exchange<'a> {
    pub fn new(request: &'a dyn RequestInfo, route_path: impl Into<String>) -> Self {
        Self {
            request,
            links: LinkBuilder::for_request(request),
            route_path: route_path.into(),
            failure: None,
        }
    }

    /// Attach the failure an exception handler is rendering.
    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    pub fn request(&self) -> &'a dyn RequestInfo {
        self.request
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    pub fn parameters(&self) -> &QueryString {
        self.request.parameters()
    }

    /// Request path without the context path. For the not-found handler this
    /// is the path that could not be mapped.
    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    /// Message of the failure being handled, for exception handlers.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

impl std::fmt::Debug for Exchange<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("method", self.request.method())
            .field("route_path", &self.route_path)
            .field("links", &self.links)
            .field("failure", &self.failure)
            .finish()
    }
}
