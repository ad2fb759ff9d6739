//! actionmap: map HTTP requests to typed actions.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::forwarded ──▶ routing::table
//!                     (axum, layers)   (X-Forwarded-*)     (method + path)
//!                                                                │
//!                                                                ▼
//!                                      params::binder ◀──── routing::action
//!                                      (typed fields)       (perform → Outcome)
//!                                                                │
//!     Client Response                                            ▼
//!     ◀────────────── http::response ◀──────────────── http::link / redirect
//!                     (render)                          (context-aware URLs)
//!
//!     Cross-cutting: config (TOML + validation), observability (tracing, metrics)
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod params;
pub mod routing;

// Cross-cutting concerns
pub mod observability;

// Sample application
pub mod demo;

pub use config::AppConfig;
pub use http::{HttpServer, LinkBuilder, QueryString};
pub use params::ParameterBinder;
pub use routing::{PathResolver, RouteTable};
