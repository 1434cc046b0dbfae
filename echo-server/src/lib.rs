//! Fixture HTTP server for exercising the interception client end-to-end.
//!
//! Every route accepts any method. Paths are matched in a fixed order so
//! `/echo-body` is served before the `/echo` prefix route.

use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Delay applied by the `/slow` route.
pub const SLOW_DELAY: Duration = Duration::from_millis(100);

/// Payload returned by any path starting with `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Path and query exactly as received.
    pub url: String,
}

pub fn app() -> Router {
    Router::new().fallback(route)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn route(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    tracing::debug!(%method, %url, "request");

    match uri.path() {
        "/echo-body" => text(StatusCode::OK, String::from_utf8_lossy(&body)),
        path if path.starts_with("/echo") => Json(Echo {
            method: method.to_string(),
            headers: collect_headers(&headers),
            url,
        })
        .into_response(),
        "/slow" => {
            tokio::time::sleep(SLOW_DELAY).await;
            text(StatusCode::OK, "slow-response")
        }
        "/401" => text(StatusCode::UNAUTHORIZED, "unauthorized"),
        "/500" => text(StatusCode::INTERNAL_SERVER_ERROR, "server-error"),
        "/201" => text(StatusCode::CREATED, "created"),
        _ => text(StatusCode::OK, "ok"),
    }
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body.into()).into_response()
}

/// Header names arrive lower-cased from hyper; non-UTF-8 values are skipped.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
