//! Canonical path resolution for handler types.
//!
//! # Precedence
//! 1. No handler, or the home handler → `/`
//! 2. Explicit, non-blank route path
//! 3. Path of the `same_as` handler (recursively)
//! 4. Lower-cased simple type name
//!
//! The result always starts with `/`.

use std::any::TypeId;

use crate::routing::route::{HandlerRef, Routed};
use crate::routing::types::RoutingError;

/// Resolves the route path of a handler type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    /// Resolve the path for `handler`. `None` resolves to the root path.
    pub fn resolve(handler: impl Into<Option<HandlerRef>>) -> Result<String, RoutingError> {
        let mut visited: Vec<(TypeId, &'static str)> = Vec::new();
        let path = Self::resolve_inner(handler.into(), &mut visited)?;
        Ok(leading_slash(path))
    }

    /// Resolve the path for the handler type `H`.
    pub fn path_of<H: Routed>() -> Result<String, RoutingError> {
        Self::resolve(HandlerRef::of::<H>())
    }

    fn resolve_inner(
        handler: Option<HandlerRef>,
        visited: &mut Vec<(TypeId, &'static str)>,
    ) -> Result<String, RoutingError> {
        let handler = match handler {
            Some(h) if !h.is_home() => h,
            _ => return Ok("/".to_string()),
        };

        if visited.iter().any(|(id, _)| *id == handler.type_id()) {
            let mut chain: Vec<&'static str> = visited.iter().map(|(_, name)| *name).collect();
            chain.push(handler.type_name());
            return Err(RoutingError::SameAsCycle { chain });
        }
        visited.push((handler.type_id(), handler.type_name()));

        let route = handler.route().ok_or(RoutingError::MissingRoute {
            type_name: handler.type_name(),
        })?;

        if let Some(path) = route.explicit_path() {
            return Ok(path.to_string());
        }

        match route.alias() {
            Some(alias) => Self::resolve_inner(Some(alias), visited),
            None => Ok(handler.simple_name().to_lowercase()),
        }
    }
}

/// Prefix `path` with `/` unless it already has one.
pub(crate) fn leading_slash(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route::Route;

    struct Home;
    impl Routed for Home {
        const HOME: bool = true;
    }

    struct HomeWithRoute;
    impl Routed for HomeWithRoute {
        const HOME: bool = true;
        fn route() -> Option<Route> {
            Some(Route::path("/ignored"))
        }
    }

    struct Profile;
    impl Routed for Profile {
        fn route() -> Option<Route> {
            Some(Route::new())
        }
    }

    struct ProfileUpdate;
    impl Routed for ProfileUpdate {
        fn route() -> Option<Route> {
            Some(Route::same_as::<Profile>())
        }
    }

    struct Slashed;
    impl Routed for Slashed {
        fn route() -> Option<Route> {
            Some(Route::path("/test"))
        }
    }

    struct Unslashed;
    impl Routed for Unslashed {
        fn route() -> Option<Route> {
            Some(Route::path("test"))
        }
    }

    struct Blank;
    impl Routed for Blank {
        fn route() -> Option<Route> {
            Some(Route::path("   "))
        }
    }

    struct Bare;
    impl Routed for Bare {}

    struct AliasToBare;
    impl Routed for AliasToBare {
        fn route() -> Option<Route> {
            Some(Route::same_as::<Bare>())
        }
    }

    struct Ping;
    impl Routed for Ping {
        fn route() -> Option<Route> {
            Some(Route::same_as::<Pong>())
        }
    }

    struct Pong;
    impl Routed for Pong {
        fn route() -> Option<Route> {
            Some(Route::same_as::<Ping>())
        }
    }

    struct SelfAlias;
    impl Routed for SelfAlias {
        fn route() -> Option<Route> {
            Some(Route::same_as::<SelfAlias>())
        }
    }

    #[test]
    fn test_home_and_none_resolve_to_root() {
        assert_eq!(PathResolver::resolve(None).unwrap(), "/");
        assert_eq!(PathResolver::path_of::<Home>().unwrap(), "/");
        assert_eq!(PathResolver::path_of::<HomeWithRoute>().unwrap(), "/");
    }

    #[test]
    fn test_default_path_is_lowercased_type_name() {
        assert_eq!(PathResolver::path_of::<Profile>().unwrap(), "/profile");
        assert_eq!(PathResolver::path_of::<Blank>().unwrap(), "/blank");
    }

    #[test]
    fn test_explicit_path_gets_leading_slash() {
        assert_eq!(PathResolver::path_of::<Slashed>().unwrap(), "/test");
        assert_eq!(PathResolver::path_of::<Unslashed>().unwrap(), "/test");
    }

    #[test]
    fn test_same_as_follows_target() {
        assert_eq!(
            PathResolver::path_of::<ProfileUpdate>().unwrap(),
            PathResolver::path_of::<Profile>().unwrap()
        );
    }

    #[test]
    fn test_missing_route_names_type() {
        let err = PathResolver::path_of::<Bare>().unwrap_err();
        match err {
            RoutingError::MissingRoute { type_name } => assert!(type_name.ends_with("Bare")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            PathResolver::path_of::<AliasToBare>(),
            Err(RoutingError::MissingRoute { .. })
        ));
    }

    #[test]
    fn test_same_as_cycle_is_detected() {
        match PathResolver::path_of::<Ping>().unwrap_err() {
            RoutingError::SameAsCycle { chain } => {
                assert_eq!(chain.len(), 3);
                assert!(chain[0].ends_with("Ping"));
                assert!(chain[1].ends_with("Pong"));
                assert!(chain[2].ends_with("Ping"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            PathResolver::path_of::<SelfAlias>(),
            Err(RoutingError::SameAsCycle { .. })
        ));
    }
}
