//! Shared utilities for integration tests.

#![allow(dead_code)]

use actionmap::config::AppConfig;
use actionmap::http::HttpServer;
use actionmap::routing::RouteTable;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Default configuration mounted under `context`.
pub fn test_config(context: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.context.path = context.to_string();
    config
}

/// Demo server wired for in-process requests.
pub fn demo_server(config: AppConfig) -> HttpServer {
    let table = actionmap::demo::route_table().unwrap();
    HttpServer::new(config, table)
}

/// A request addressed to `localhost`.
pub fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Host", "localhost")
}

/// A url-encoded form POST.
pub fn form(uri: &str, body: &str) -> Request<Body> {
    request(Method::POST, uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as text.
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serve `table` on an ephemeral port. Dropping the sender stops the server.
pub async fn spawn_server(config: AppConfig, table: RouteTable) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let server = HttpServer::new(config, table);
    tokio::spawn(async move {
        let _ = server
            .run_until(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    (addr, tx)
}
