//! Reverse-proxy normalization of request origin.
//!
//! # Responsibilities
//! - Honour `X-Forwarded-Host`, `X-Forwarded-Proto` and `X-Forwarded-For`
//! - Pass every other accessor straight through
//!
//! # Design Decisions
//! - Overrides are computed once, on the first origin accessor, then memoized
//! - A forwarded host may carry a port; a forwarded scheme then still forces
//!   the scheme's standard port and secure flag
//! - Only the first substitution in the process is logged

use axum::http::uri::Authority;
use axum::http::Method;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::http::query::QueryString;
use crate::http::request::{default_port, RequestInfo};

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

static SPOKEN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
struct Origin {
    scheme: String,
    host: String,
    port: u16,
    secure: bool,
    remote_addr: String,
}

/// Decorates a request with origin information reported by a reverse proxy.
#[derive(Debug)]
pub struct ForwardedRequestView<R> {
    inner: R,
    origin: OnceLock<Origin>,
}

impl<R: RequestInfo> ForwardedRequestView<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            origin: OnceLock::new(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn origin(&self) -> &Origin {
        self.origin.get_or_init(|| compute_origin(&self.inner))
    }
}

fn compute_origin<R: RequestInfo>(request: &R) -> Origin {
    let mut origin = Origin {
        scheme: request.scheme().to_string(),
        host: request.host().to_string(),
        port: request.port(),
        secure: request.is_secure(),
        remote_addr: request.remote_addr().to_string(),
    };
    let mut substituted = false;

    if let Some(value) = first_value(request.header(X_FORWARDED_HOST)) {
        match value.parse::<Authority>() {
            Ok(authority) => {
                if authority.host() != origin.host {
                    origin.host = authority.host().to_string();
                    substituted = true;
                }
                if let Some(port) = authority.port_u16().filter(|p| *p != origin.port) {
                    origin.port = port;
                    substituted = true;
                }
            }
            Err(e) => {
                tracing::debug!(value = %value, error = %e, "Ignoring malformed forwarded host");
            }
        }
    }

    if let Some(scheme) = first_value(request.header(X_FORWARDED_PROTO)) {
        let scheme = scheme.to_ascii_lowercase();
        if scheme != origin.scheme {
            origin.secure = scheme == "https";
            origin.port = default_port(&scheme);
            origin.scheme = scheme;
            substituted = true;
        }
    }

    if let Some(client) = first_value(request.header(X_FORWARDED_FOR)) {
        if client != origin.remote_addr {
            origin.remote_addr = client.to_string();
            substituted = true;
        }
    }

    if substituted && !SPOKEN.swap(true, Ordering::Relaxed) {
        tracing::info!(
            scheme = %origin.scheme,
            host = %origin.host,
            port = origin.port,
            secure = origin.secure,
            client = %origin.remote_addr,
            "Request origin updated from forwarding headers"
        );
    }

    origin
}

/// Left-most entry of a comma-separated forwarding header.
fn first_value(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<R: RequestInfo> RequestInfo for ForwardedRequestView<R> {
    fn method(&self) -> &Method {
        self.inner.method()
    }

    fn path(&self) -> &str {
        self.inner.path()
    }

    fn scheme(&self) -> &str {
        &self.origin().scheme
    }

    fn host(&self) -> &str {
        &self.origin().host
    }

    fn port(&self) -> u16 {
        self.origin().port
    }

    fn is_secure(&self) -> bool {
        self.origin().secure
    }

    fn remote_addr(&self) -> &str {
        &self.origin().remote_addr
    }

    fn context_path(&self) -> &str {
        self.inner.context_path()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.inner.header(name)
    }

    fn parameters(&self) -> &QueryString {
        self.inner.parameters()
    }
}
