//! Redirect responses.
//!
//! A redirect names its target either as a handler type or as a URI. Before
//! the response is written, a target without a host is turned into an
//! absolute URL on the current origin, under the deployment context path.

use axum::http::{StatusCode, Uri};
use url::Url;

use crate::http::link::{LinkBuilder, LinkError};
use crate::http::query::QueryString;
use crate::routing::{HandlerRef, PathResolver, Routed};

/// Where a redirect points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The route path of a handler type.
    Handler(HandlerRef),
    /// A relative or absolute URI.
    Uri(Uri),
}

/// A redirect to another handler or location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    status: StatusCode,
    target: RedirectTarget,
    query: Option<QueryString>,
    fragment: Option<String>,
}

impl Redirect {
    /// Redirect to the handler type `H` with `302 Found`.
    pub fn to<H: Routed>() -> Self {
        Self::to_handler(HandlerRef::of::<H>())
    }

    pub fn to_handler(handler: HandlerRef) -> Self {
        Self::new(RedirectTarget::Handler(handler))
    }

    pub fn to_uri(uri: Uri) -> Self {
        Self::new(RedirectTarget::Uri(uri))
    }

    fn new(target: RedirectTarget) -> Self {
        Self {
            status: StatusCode::FOUND,
            target,
            query: None,
            fragment: None,
        }
    }

    /// Replace the target's own query with `query`.
    pub fn with_query(mut self, query: QueryString) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn target(&self) -> &RedirectTarget {
        &self.target
    }

    /// The `Location` to send.
    ///
    /// A URI target that already names a host keeps its origin and path.
    /// Anything else is placed on the origin of `links`, below its context
    /// path. In both cases `with_query` replaces the target's own query and
    /// `with_fragment` sets the fragment.
    pub fn absolute_location(&self, links: &LinkBuilder) -> Result<Url, LinkError> {
        let mut url = match &self.target {
            RedirectTarget::Uri(uri) if uri.host().is_some() => {
                Url::parse(&uri.to_string()).map_err(|e| LinkError::Build {
                    scheme: uri.scheme_str().unwrap_or_default().to_string(),
                    host: uri.host().unwrap_or_default().to_string(),
                    port: uri.port_u16().unwrap_or_default(),
                    path: uri.path().to_string(),
                    query: uri.query().map(str::to_string),
                    fragment: self.fragment.clone(),
                    reason: e.to_string(),
                })?
            }
            RedirectTarget::Uri(uri) => {
                let mut url = links.url_to(uri.path(), None, None)?;
                url.set_query(uri.query());
                url
            }
            RedirectTarget::Handler(handler) => {
                links.url_to(&PathResolver::resolve(*handler)?, None, None)?
            }
        };

        if let Some(query) = &self.query {
            url.set_query(query.to_query_string().as_deref());
        }
        if let Some(fragment) = self.fragment.as_deref().filter(|f| !f.is_empty()) {
            url.set_fragment(Some(fragment));
        }

        tracing::debug!(location = %url, "Resolved redirect location");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Route;

    struct Dashboard;
    impl Routed for Dashboard {
        fn route() -> Option<Route> {
            Some(Route::path("dashboard"))
        }
    }

    struct Landing;
    impl Routed for Landing {
        const HOME: bool = true;
    }

    fn links(port: u16) -> LinkBuilder {
        LinkBuilder::new("http", "example.com", port, "/app").with_drop_context(false)
    }

    #[test]
    fn test_defaults_to_found() {
        let redirect = Redirect::to::<Dashboard>();
        assert_eq!(redirect.status(), StatusCode::FOUND);
        assert_eq!(
            redirect.target(),
            &RedirectTarget::Handler(HandlerRef::of::<Dashboard>())
        );
        let moved = redirect.with_status(StatusCode::SEE_OTHER);
        assert_eq!(moved.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_handler_target_is_made_absolute() {
        let location = Redirect::to::<Dashboard>()
            .absolute_location(&links(8080))
            .unwrap();
        assert_eq!(location.as_str(), "http://example.com:8080/app/dashboard");

        let home = Redirect::to::<Landing>().absolute_location(&links(80)).unwrap();
        assert_eq!(home.as_str(), "http://example.com/app/");
    }

    #[test]
    fn test_query_and_fragment() {
        let location = Redirect::to::<Dashboard>()
            .with_query(QueryString::with("tab", ["alerts"]))
            .with_fragment("latest")
            .absolute_location(&links(80))
            .unwrap();
        assert_eq!(
            location.as_str(),
            "http://example.com/app/dashboard?tab=alerts#latest"
        );
    }

    #[test]
    fn test_relative_uri_keeps_its_query_unless_replaced() {
        let uri: Uri = "/search?q=rust".parse().unwrap();
        let kept = Redirect::to_uri(uri.clone())
            .absolute_location(&links(80))
            .unwrap();
        assert_eq!(kept.as_str(), "http://example.com/app/search?q=rust");

        let replaced = Redirect::to_uri(uri)
            .with_query(QueryString::new())
            .absolute_location(&links(80))
            .unwrap();
        assert_eq!(replaced.as_str(), "http://example.com/app/search");
    }

    #[test]
    fn test_absolute_uri_is_untouched() {
        let uri: Uri = "https://elsewhere.example/login".parse().unwrap();
        let location = Redirect::to_uri(uri).absolute_location(&links(80)).unwrap();
        assert_eq!(location.as_str(), "https://elsewhere.example/login");
    }

    #[test]
    fn test_absolute_uri_takes_query_and_fragment() {
        let uri: Uri = "https://elsewhere.example/login?next=a".parse().unwrap();
        let kept = Redirect::to_uri(uri.clone())
            .with_fragment("form")
            .absolute_location(&links(80))
            .unwrap();
        assert_eq!(kept.as_str(), "https://elsewhere.example/login?next=a#form");

        let replaced = Redirect::to_uri(uri)
            .with_query(QueryString::with("next", ["/app/dashboard"]))
            .absolute_location(&links(80))
            .unwrap();
        assert_eq!(
            replaced.as_str(),
            "https://elsewhere.example/login?next=%2Fapp%2Fdashboard"
        );
    }
}
