//! Path resolution and link building through the public API.

use actionmap::http::{HttpRequest, LinkBuilder, QueryString};
use actionmap::routing::{HandlerRef, PathResolver, Route, Routed, RoutingError};
use axum::http::Request;

struct Home;
impl Routed for Home {
    const HOME: bool = true;
}

struct Profile;
impl Routed for Profile {
    fn route() -> Option<Route> {
        Some(Route::new())
    }
}

struct EditProfile;
impl Routed for EditProfile {
    fn route() -> Option<Route> {
        Some(Route::same_as::<Profile>())
    }
}

struct Reports;
impl Routed for Reports {
    fn route() -> Option<Route> {
        Some(Route::path("admin/reports"))
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

fn links(context: &str) -> LinkBuilder {
    LinkBuilder::new("http", "localhost", 8080, context).with_drop_context(false)
}

#[test]
fn test_path_precedence() {
    assert_eq!(PathResolver::path_of::<Home>().unwrap(), "/");
    assert_eq!(PathResolver::path_of::<Profile>().unwrap(), "/profile");
    assert_eq!(PathResolver::path_of::<EditProfile>().unwrap(), "/profile");
    assert_eq!(PathResolver::path_of::<Reports>().unwrap(), "/admin/reports");
    assert_eq!(PathResolver::resolve(None).unwrap(), "/");
}

#[test]
fn test_same_as_cycle_is_reported() {
    let err = PathResolver::path_of::<Ping>().unwrap_err();
    assert!(matches!(err, RoutingError::SameAsCycle { .. }));
}

#[test]
fn test_handler_links_under_context() {
    let app = links("/app");
    assert_eq!(
        app.resolve_handler(HandlerRef::of::<Profile>()).unwrap(),
        "/app/profile"
    );
    assert_eq!(app.resolve_handler(HandlerRef::of::<Home>()).unwrap(), "/app/");

    let query = QueryString::with("tab", ["settings"]);
    assert_eq!(
        app.path_for(HandlerRef::of::<EditProfile>(), Some(&query))
            .unwrap(),
        "/app/profile?tab=settings"
    );
}

#[test]
fn test_absolute_urls() {
    let app = links("/app");
    assert_eq!(app.url().unwrap().as_str(), "http://localhost:8080/app");
    assert_eq!(
        app.url_with(HandlerRef::of::<Reports>(), None, Some("top"))
            .unwrap()
            .as_str(),
        "http://localhost:8080/app/admin/reports#top"
    );

    let root = links("");
    assert_eq!(root.url().unwrap().as_str(), "http://localhost:8080/");
}

#[test]
fn test_dropped_context_builder() {
    let dropped = links("/app").with_drop_context(true);
    assert_eq!(dropped.context_path(), "");
    assert_eq!(
        dropped.resolve_handler(HandlerRef::of::<Profile>()).unwrap(),
        "/profile"
    );
}

#[test]
fn test_links_for_request_origin() {
    let request = Request::builder()
        .uri("/shop/cart")
        .header("Host", "store.example:8443")
        .body(())
        .unwrap();
    let request = HttpRequest::from_request(request, "10.1.1.1:4000".parse().unwrap(), "/shop");

    let links = LinkBuilder::for_request(&request).with_drop_context(false);
    assert_eq!(
        links
            .url_for(HandlerRef::of::<Profile>(), None)
            .unwrap()
            .as_str(),
        "http://store.example:8443/shop/profile"
    );
}
