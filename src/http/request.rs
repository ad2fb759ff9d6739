//! Request abstraction.
//!
//! # Responsibilities
//! - Expose origin information (scheme, host, port, client) to the core
//! - Collect query and form parameters into one ordered `QueryString`
//!
//! # Design Decisions
//! - The core only sees `RequestInfo`, never the transport's request type
//! - Host and port come from the `Host` header, then the URI authority, then the peer
//! - Form parameters follow query parameters

use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::http::uri::Authority;
use axum::http::{HeaderMap, Method, Request};
use std::net::{IpAddr, SocketAddr};

use crate::http::query::QueryString;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Read access to an inbound request.
pub trait RequestInfo: Send + Sync {
    fn method(&self) -> &Method;

    /// Request path including the deployment context path.
    fn path(&self) -> &str;

    fn scheme(&self) -> &str;

    fn host(&self) -> &str;

    fn port(&self) -> u16;

    fn is_secure(&self) -> bool;

    /// Address of the calling client.
    fn remote_addr(&self) -> &str;

    /// Prefix the application is mounted under; empty for the root context.
    fn context_path(&self) -> &str;

    fn header(&self, name: &str) -> Option<&str>;

    /// Query and form parameters, in arrival order.
    fn parameters(&self) -> &QueryString;
}

/// A request as seen by the framework.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    scheme: String,
    host: String,
    port: u16,
    remote_addr: String,
    context_path: String,
    headers: HeaderMap,
    parameters: QueryString,
}

impl HttpRequest {
    /// Build from request parts. `body` is read as form parameters when the
    /// request declares a url-encoded content type.
    pub fn from_parts(parts: &Parts, peer: SocketAddr, context_path: &str, body: &[u8]) -> Self {
        let scheme = parts.uri.scheme_str().unwrap_or("http").to_ascii_lowercase();

        let authority = parts
            .headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.parse::<Authority>().ok())
            .or_else(|| parts.uri.authority().cloned());
        let (host, port) = match authority {
            Some(a) => (
                a.host().to_string(),
                a.port_u16().unwrap_or_else(|| default_port(&scheme)),
            ),
            None => (host_literal(peer.ip()), peer.port()),
        };

        let mut parameters = QueryString::from_uri(&parts.uri);
        let is_form = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false);
        if is_form && !body.is_empty() {
            parameters.extend(QueryString::parse(&String::from_utf8_lossy(body)));
        }

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            scheme,
            host,
            port,
            remote_addr: peer.ip().to_string(),
            context_path: normalize_context_path(context_path),
            headers: parts.headers.clone(),
            parameters,
        }
    }

    /// Build from a request without a body, e.g. in tests.
    pub fn from_request<B>(request: Request<B>, peer: SocketAddr, context_path: &str) -> Self {
        let (parts, _) = request.into_parts();
        Self::from_parts(&parts, peer, context_path, &[])
    }
}

impl RequestInfo for HttpRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn context_path(&self) -> &str {
        &self.context_path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn parameters(&self) -> &QueryString {
        &self.parameters
    }
}

/// Standard port for a scheme.
pub fn default_port(scheme: &str) -> u16 {
    if scheme.eq_ignore_ascii_case("https") {
        443
    } else {
        80
    }
}

/// `""` and `"/"` mean the root context; otherwise one leading slash, no trailing slash.
pub fn normalize_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// `ip` as it appears in a URL authority; IPv6 literals are bracketed.
fn host_literal(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    }
}
