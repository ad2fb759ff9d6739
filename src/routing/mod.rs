//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Handler type (Routed: HOME, route())
//!     → path.rs (canonical path: home, explicit, same_as, type name)
//!     → table.rs (method + path → action, built once at startup)
//!
//! Incoming request (already context-relative)
//!     → table.rs lookup
//!     → action.rs (bind parameters, perform)
//!     → Outcome
//! ```
//!
//! # Design Decisions
//! - Routes resolved at startup, immutable at runtime
//! - Route metadata is static per type, never discovered by scanning
//! - Configuration mistakes surface as `RoutingError` when the table is built

pub mod action;
pub mod path;
pub mod route;
pub mod table;
pub mod types;

pub use action::{Action, ActionError, Exchange, Outcome};
pub use path::PathResolver;
pub use route::{HandlerRef, Route, Routed};
pub use table::{RouteMatch, RouteTable, RouteTableBuilder};
pub use types::RoutingError;
