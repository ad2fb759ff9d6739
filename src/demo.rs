//! Sample actions served by the `actionmap` binary.
//!
//! ```text
//! GET  /          Home         links to the other pages
//! GET  /profile   Profile      form posting to SaveProfile
//! POST /profile   SaveProfile  same path as Profile, redirects back
//! GET  /search    Search       typed query parameters, JSON result
//! GET  /crash     Crash        always fails, rendered by Failure
//! *    (unmatched) NotFound
//! ```

use axum::http::StatusCode;
use serde_json::json;

use crate::http::query::QueryString;
use crate::http::redirect::Redirect;
use crate::params::{Bindable, ParamEnum, Parameter, SchemaBuilder};
use crate::routing::{
    Action, ActionError, Exchange, HandlerRef, Outcome, Route, RouteTable, Routed, RoutingError,
};

/// The route table of the demo application.
pub fn route_table() -> Result<RouteTable, RoutingError> {
    RouteTable::builder()
        .get::<Home>()
        .get::<Profile>()
        .post::<SaveProfile>()
        .get::<Search>()
        .get::<Crash>()
        .not_found::<NotFound>()
        .exception::<Failure>()
        .build()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    )
}

/// Landing page.
#[derive(Debug, Default)]
pub struct Home;

impl Routed for Home {
    const HOME: bool = true;
}

impl Bindable for Home {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
    }
}

impl Action for Home {
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        let links = exchange.links();
        let profile = links.resolve_handler(HandlerRef::of::<Profile>())?;
        let search = links.path_for(
            HandlerRef::of::<Search>(),
            Some(&QueryString::with("q", ["rust"])),
        )?;
        let body = format!(
            "<h1>actionmap</h1><ul><li><a href=\"{}\">Profile</a></li><li><a href=\"{}\">Search</a></li></ul>",
            escape(&profile.to_string()),
            escape(&search.to_string())
        );
        Ok(Outcome::Html(page("Home", &body)))
    }
}

/// Shows a profile form.
#[derive(Debug, Default)]
pub struct Profile {
    name: Option<String>,
}

impl Routed for Profile {
    fn route() -> Option<Route> {
        Some(Route::new())
    }
}

impl Bindable for Profile {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema.field(Parameter::field("name"), |p| &mut p.name)
    }
}

fn profile_form(
    exchange: &Exchange<'_>,
    name: Option<&str>,
    error: Option<&str>,
) -> Result<String, ActionError> {
    let submit_to = exchange
        .links()
        .resolve_handler(HandlerRef::of::<SaveProfile>())?;
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape(e)))
        .unwrap_or_default();
    let body = format!(
        "<h1>Profile</h1>{}<form method=\"post\" action=\"{}\">\
         <input name=\"name\" value=\"{}\"><input name=\"age\">\
         <input type=\"checkbox\" name=\"subscribe\" value=\"on\">\
         <button>Save</button></form>",
        error,
        escape(&submit_to.to_string()),
        escape(name.unwrap_or_default())
    );
    Ok(page("Profile", &body))
}

impl Action for Profile {
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        Ok(Outcome::Html(profile_form(exchange, self.name.as_deref(), None)?))
    }
}

/// Accepts the profile form.
#[derive(Debug, Default)]
pub struct SaveProfile {
    name: String,
    age: Option<i32>,
    subscribe: bool,
}

impl Routed for SaveProfile {
    fn route() -> Option<Route> {
        Some(Route::same_as::<Profile>())
    }
}

impl Bindable for SaveProfile {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .field(Parameter::field("name").required(), |s| &mut s.name)
            .field(Parameter::field("age"), |s| &mut s.age)
            .field(Parameter::field("subscribe"), |s| &mut s.subscribe)
    }
}

impl Action for SaveProfile {
    fn perform(&mut self, _exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        tracing::info!(
            name = %self.name,
            age = ?self.age,
            subscribe = self.subscribe,
            "Profile saved"
        );
        let query = QueryString::with("name", [self.name.as_str()]);
        Ok(Outcome::Redirect(
            Redirect::to::<Profile>()
                .with_query(query)
                .with_fragment("saved"),
        ))
    }

    fn invalid(&mut self, exchange: &Exchange<'_>) -> Outcome {
        match profile_form(exchange, None, Some("Please enter a name.")) {
            Ok(body) => Outcome::Html(body).with_status(StatusCode::BAD_REQUEST),
            Err(e) => {
                tracing::error!(error = %e, "Unable to render profile form");
                Outcome::Status(StatusCode::BAD_REQUEST)
            }
        }
    }
}

/// Result ordering for [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Relevance,
    Newest,
}

impl ParamEnum for Sort {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Relevance" => Some(Sort::Relevance),
            "Newest" => Some(Sort::Newest),
            _ => None,
        }
    }
}

/// Paging parameters shared by list pages.
#[derive(Debug, Default)]
pub struct Paging {
    page: Option<i32>,
    per_page: Option<i32>,
}

impl Bindable for Paging {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .field(Parameter::field("page"), |p| &mut p.page)
            .field(Parameter::field("per_page").named("size"), |p| &mut p.per_page)
    }
}

/// Echoes typed search parameters.
#[derive(Debug, Default)]
pub struct Search {
    query: String,
    sort: Option<Sort>,
    exact: Option<bool>,
    paging: Paging,
}

impl Routed for Search {
    fn route() -> Option<Route> {
        Some(Route::path("search"))
    }
}

impl Bindable for Search {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .field(Parameter::field("query").named("q").required(), |s| &mut s.query)
            .enum_field(Parameter::field("sort"), |s| &mut s.sort)
            .field(Parameter::field("exact"), |s| &mut s.exact)
            .inherit(|s| &mut s.paging)
    }
}

impl Action for Search {
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        let page = self.paging.page.unwrap_or(1);
        let mut next = QueryString::with("q", [self.query.as_str()]);
        next.add("page", [page.saturating_add(1).to_string()]);
        let next = exchange
            .links()
            .url_for(HandlerRef::of::<Search>(), Some(&next))?;

        Ok(Outcome::Json(json!({
            "query": self.query,
            "sort": format!("{:?}", self.sort.unwrap_or(Sort::Relevance)),
            "exact": self.exact.unwrap_or(false),
            "page": page,
            "size": self.paging.per_page.unwrap_or(10),
            "next": next.as_str(),
        })))
    }

    fn invalid(&mut self, _exchange: &Exchange<'_>) -> Outcome {
        Outcome::Json(json!({ "error": "missing query parameter q" }))
            .with_status(StatusCode::BAD_REQUEST)
    }
}

/// Always fails.
#[derive(Debug, Default)]
pub struct Crash;

impl Routed for Crash {
    fn route() -> Option<Route> {
        Some(Route::new())
    }
}

impl Bindable for Crash {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
    }
}

impl Action for Crash {
    fn perform(&mut self, _exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        Err(ActionError::failed("crash requested"))
    }
}

/// Rendered for unmatched paths.
#[derive(Debug, Default)]
pub struct NotFound;

impl Routed for NotFound {
    fn route() -> Option<Route> {
        Some(Route::path("/not-found"))
    }
}

impl Bindable for NotFound {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
    }
}

impl Action for NotFound {
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        let home = exchange.links().resolve_handler(HandlerRef::of::<Home>())?;
        let body = format!(
            "<h1>Not found</h1><p>Nothing lives at {}.</p><p><a href=\"{}\">Home</a></p>",
            escape(exchange.route_path()),
            escape(&home.to_string())
        );
        Ok(Outcome::Html(page("Not found", &body)))
    }
}

/// Rendered when another action fails.
#[derive(Debug, Default)]
pub struct Failure;

impl Routed for Failure {
    fn route() -> Option<Route> {
        Some(Route::path("/error"))
    }
}

impl Bindable for Failure {
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
    }
}

impl Action for Failure {
    fn perform(&mut self, exchange: &Exchange<'_>) -> Result<Outcome, ActionError> {
        let body = format!(
            "<h1>Something went wrong</h1><p>{}</p>",
            escape(exchange.failure().unwrap_or("unknown error"))
        );
        Ok(Outcome::Html(page("Error", &body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::PathResolver;

    #[test]
    fn test_route_table_builds() {
        let table = route_table().unwrap();
        assert_eq!(table.paths(), vec!["/", "/crash", "/profile", "/search"]);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_demo_paths() {
        assert_eq!(PathResolver::path_of::<Home>().unwrap(), "/");
        assert_eq!(PathResolver::path_of::<SaveProfile>().unwrap(), "/profile");
        assert_eq!(PathResolver::path_of::<Search>().unwrap(), "/search");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }
}
