//! Route metadata attached to handler types.
//!
//! # Responsibilities
//! - Declare the path (or alias) a handler type is reachable under
//! - Mark the single home handler
//! - Carry handler types around as plain values (`HandlerRef`)
//!
//! # Design Decisions
//! - Metadata is a static function on the type, read on demand
//! - A handler without metadata is legal until something needs its path

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Implemented by every handler type that can be linked to.
///
/// ```
/// use actionmap::routing::{Route, Routed};
///
/// struct Profile;
///
/// impl Routed for Profile {
///     fn route() -> Option<Route> {
///         Some(Route::new())
///     }
/// }
/// ```
pub trait Routed: 'static {
    /// Home marker. The home handler always resolves to `/`.
    const HOME: bool = false;

    /// Route metadata, or `None` when the type declares none.
    fn route() -> Option<Route> {
        None
    }
}

/// Declarative path information for a handler type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    path: Option<Cow<'static, str>>,
    same_as: Option<HandlerRef>,
}

impl Route {
    /// Route with no explicit path; resolves to the lower-cased type name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route with an explicit path. A missing leading slash is added on resolution.
    pub fn path(path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            path: Some(path.into()),
            same_as: None,
        }
    }

    /// Route that shares the path of another handler, e.g. a POST twin of a GET handler.
    pub fn same_as<H: Routed>() -> Self {
        Self {
            path: None,
            same_as: Some(HandlerRef::of::<H>()),
        }
    }

    /// The explicit path, if one is set and not blank.
    pub fn explicit_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// The aliased handler, if any.
    pub fn alias(&self) -> Option<HandlerRef> {
        self.same_as
    }
}

/// A handler type as a value.
#[derive(Clone, Copy)]
pub struct HandlerRef {
    type_id: TypeId,
    type_name: &'static str,
    home: bool,
    route: fn() -> Option<Route>,
}

impl HandlerRef {
    /// Capture the handler type `H`.
    pub fn of<H: Routed>() -> Self {
        Self {
            type_id: TypeId::of::<H>(),
            type_name: std::any::type_name::<H>(),
            home: H::HOME,
            route: H::route,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generic arguments.
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.type_name)
    }

    pub fn is_home(&self) -> bool {
        self.home
    }

    pub fn route(&self) -> Option<Route> {
        (self.route)()
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for HandlerRef {}

impl Hash for HandlerRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef").field(&self.type_name).finish()
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

fn simple_name(type_name: &'static str) -> &'static str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
