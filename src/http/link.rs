//! Link construction.
//!
//! # Responsibilities
//! - Prefix route paths with the deployment context path
//! - Build absolute URLs from the request origin
//! - Attach query strings and fragments
//!
//! # Design Decisions
//! - Relative links are `http::Uri` (origin-form), absolute links are `url::Url`
//! - The drop-context flag is process-wide configuration, snapshotted per builder
//! - Default ports (80 for http, 443 for https) never appear in URLs

use axum::http::Uri;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use url::Url;

use crate::http::query::QueryString;
use crate::http::request::{normalize_context_path, RequestInfo};
use crate::routing::path::leading_slash;
use crate::routing::{HandlerRef, PathResolver, RoutingError};

static DROP_CONTEXT: AtomicBool = AtomicBool::new(false);

/// Omit the deployment context path from every link built afterwards.
///
/// Meant for startup configuration and test setup only.
pub fn set_drop_context(drop: bool) {
    DROP_CONTEXT.store(drop, Ordering::SeqCst);
}

/// Current value of the process-wide drop-context flag.
pub fn drop_context() -> bool {
    DROP_CONTEXT.load(Ordering::SeqCst)
}

/// Errors raised while building links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The components do not form a valid URI.
    #[error(
        "Error building URL: scheme={scheme}, host={host}, port={port}, path={path}, \
         query={query:?}, fragment={fragment:?}: {reason}"
    )]
    Build {
        scheme: String,
        host: String,
        port: u16,
        path: String,
        query: Option<String>,
        fragment: Option<String>,
        reason: String,
    },

    /// The target handler's path could not be resolved.
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Builds links relative to the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    scheme: String,
    host: String,
    port: u16,
    context_path: String,
    drop_context: bool,
}

impl LinkBuilder {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        context_path: &str,
    ) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into(),
            port,
            context_path: normalize_context_path(context_path),
            drop_context: drop_context(),
        }
    }

    /// Builder for the origin and context of `request`.
    pub fn for_request<R: RequestInfo + ?Sized>(request: &R) -> Self {
        Self::new(
            request.scheme(),
            request.host(),
            request.port(),
            request.context_path(),
        )
    }

    /// Override the drop-context flag for this builder only.
    pub fn with_drop_context(mut self, drop: bool) -> Self {
        self.drop_context = drop;
        self
    }

    /// The context path links are prefixed with; empty when dropped or at the root.
    pub fn context_path(&self) -> &str {
        if self.drop_context {
            ""
        } else {
            &self.context_path
        }
    }

    /// Context path plus `path`, with exactly one slash between them.
    pub fn resolve(&self, path: &str) -> Result<Uri, LinkError> {
        let full = format!("{}{}", self.context_path(), leading_slash(path.to_string()));
        Uri::try_from(full.as_str()).map_err(|e| self.build_error(&full, None, None, e))
    }

    /// Context-prefixed path of a handler type.
    pub fn resolve_handler(&self, handler: HandlerRef) -> Result<Uri, LinkError> {
        let path = PathResolver::resolve(handler)?;
        self.resolve(&path)
    }

    /// Context-prefixed path of a handler type with an optional query string.
    pub fn path_for(
        &self,
        handler: HandlerRef,
        query: Option<&QueryString>,
    ) -> Result<Uri, LinkError> {
        let path = self.resolve_handler(handler)?;
        match query.and_then(QueryString::to_query_string) {
            Some(q) => {
                let full = format!("{}?{}", path.path(), q);
                Uri::try_from(full.as_str())
                    .map_err(|e| self.build_error(path.path(), Some(&q), None, e))
            }
            None => Ok(path),
        }
    }

    /// Base URL of the application: scheme, host, non-default port and context path.
    pub fn url(&self) -> Result<Url, LinkError> {
        let context = self.context_path();
        let path = if context.is_empty() { "/" } else { context };
        let raw = format!("{}://{}:{}{}", self.scheme, self.host, self.port, path);
        Url::parse(&raw).map_err(|e| self.build_error(path, None, None, e))
    }

    /// Absolute URL of a handler type.
    pub fn url_for(
        &self,
        handler: HandlerRef,
        query: Option<&QueryString>,
    ) -> Result<Url, LinkError> {
        self.url_with(handler, query, None)
    }

    /// Absolute URL of a handler type with query string and fragment.
    pub fn url_with(
        &self,
        handler: HandlerRef,
        query: Option<&QueryString>,
        fragment: Option<&str>,
    ) -> Result<Url, LinkError> {
        let path = PathResolver::resolve(handler)?;
        self.url_to(&path, query, fragment)
    }

    /// Absolute URL of an application path (context is added here).
    pub fn url_to(
        &self,
        path: &str,
        query: Option<&QueryString>,
        fragment: Option<&str>,
    ) -> Result<Url, LinkError> {
        let relative = self.resolve(path)?;
        let mut url = self.url()?;
        url.set_path(relative.path());
        let query = query.and_then(QueryString::to_query_string);
        url.set_query(query.as_deref());
        url.set_fragment(fragment.filter(|f| !f.is_empty()));
        Ok(url)
    }

    fn build_error(
        &self,
        path: &str,
        query: Option<&str>,
        fragment: Option<&str>,
        reason: impl ToString,
    ) -> LinkError {
        LinkError::Build {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path: path.to_string(),
            query: query.map(str::to_string),
            fragment: fragment.map(str::to_string),
            reason: reason.to_string(),
        }
    }
}
