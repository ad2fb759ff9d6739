//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body buffering)
//!     → request.rs (HttpRequest: origin, context path, parameters)
//!     → forwarded.rs (X-Forwarded-* overrides, when enabled)
//!     → [routing::RouteTable dispatch]
//!     → response.rs (render Outcome, absolute redirect locations)
//!     → Send to client
//!
//! Links inside actions:
//!     link.rs (context path + route path, absolute URLs)
//!     → query.rs (ordered query parameters)
//! ```

pub mod forwarded;
pub mod link;
pub mod query;
pub mod redirect;
pub mod request;
pub mod response;
pub mod server;

pub use forwarded::ForwardedRequestView;
pub use link::{drop_context, set_drop_context, LinkBuilder, LinkError};
pub use query::{Param, QueryString};
pub use redirect::{Redirect, RedirectTarget};
pub use request::{HttpRequest, RequestInfo, X_REQUEST_ID};
pub use server::HttpServer;
