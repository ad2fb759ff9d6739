//! Routing error definitions.

use thiserror::Error;

/// Configuration mistakes detected while resolving or registering routes.
///
/// These are never retried: they mean a handler type was declared wrongly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A handler referenced by path resolution carries no route metadata.
    #[error("No route metadata found on {type_name}")]
    MissingRoute { type_name: &'static str },

    /// A chain of `same_as` references loops back on itself.
    #[error("Route alias cycle detected: {}", chain.join(" -> "))]
    SameAsCycle { chain: Vec<&'static str> },

    /// Two registrations map the same method and path.
    #[error("Duplicate route {method} {path} ({first} and {second})")]
    DuplicateRoute {
        method: String,
        path: String,
        first: &'static str,
        second: &'static str,
    },

    /// More than one handler carries the home marker.
    #[error("Multiple home handlers registered: {first} and {second}")]
    MultipleHome {
        first: &'static str,
        second: &'static str,
    },
}
