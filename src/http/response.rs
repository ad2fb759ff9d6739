//! Response rendering.
//!
//! # Responsibilities
//! - Turn an action's `Outcome` into an HTTP response
//! - Make redirect locations absolute on the current origin
//!
//! # Design Decisions
//! - A redirect whose location cannot be built is a `500`, logged with the components
//! - Bodies are fully buffered; actions produce small documents

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};

use crate::http::link::LinkBuilder;
use crate::routing::Outcome;

/// Render `outcome`, resolving redirects against `links`.
pub fn render(outcome: Outcome, links: &LinkBuilder) -> Response {
    match outcome {
        Outcome::Text(body) => body.into_response(),
        Outcome::Html(body) => Html(body).into_response(),
        Outcome::Json(value) => Json(value).into_response(),
        Outcome::Status(status) => status.into_response(),
        Outcome::WithStatus(status, inner) => {
            let mut response = render(*inner, links);
            *response.status_mut() = status;
            response
        }
        Outcome::Redirect(redirect) => {
            let location = redirect
                .absolute_location(links)
                .map_err(|e| e.to_string())
                .and_then(|url| HeaderValue::from_str(url.as_str()).map_err(|e| e.to_string()));
            match location {
                Ok(location) => (redirect.status(), [(header::LOCATION, location)]).into_response(),
                Err(reason) => {
                    tracing::error!(error = %reason, "Unable to build redirect location");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
    }
}
