//! Serving middleware: answers requests that match a mock record.

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use crate::server::ServerState;

/// Key used to look a request up: the path alone for reads, the path with
/// its query for everything else.
#[must_use]
pub fn lookup_key(method: &Method, uri: &Uri) -> String {
    if method == Method::GET || method == Method::HEAD {
        uri.path().to_string()
    } else {
        uri.path_and_query().map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string())
    }
}

/// Serves the first matching record, or hands the request to `next`.
pub async fn serve_mocks(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let key = lookup_key(request.method(), request.uri());
    let snapshot = state.snapshot();
    let Some(record) = snapshot.find(&key).cloned() else {
        return next.run(request).await;
    };

    info!(method = %request.method(), url = %key, "invoke");
    if let Some(delay) = record.delay() {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(record.status()).unwrap_or_else(|_| {
        warn!(url = %key, code = record.status(), "invalid httpCode, answering 200");
        StatusCode::OK
    });
    (status, Json(record.response)).into_response()
}
