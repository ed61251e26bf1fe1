//! HTTP surface: shared snapshot state, the mock middleware and the router.

pub mod middleware;
pub mod watch;

use std::future::Future;
use std::sync::Arc;

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch as channel;

use crate::error::{Error, Result};
use crate::mock::MockSnapshot;

/// The snapshot currently served, plus its update channel.
///
/// Cheap to clone. Publishing swaps the whole snapshot; readers hold an
/// `Arc` to whichever snapshot was current when they looked.
#[derive(Clone)]
pub struct ServerState {
    snapshots: Arc<channel::Sender<Arc<MockSnapshot>>>,
}

impl ServerState {
    /// Creates state serving `initial`.
    #[must_use]
    pub fn new(initial: MockSnapshot) -> Self {
        let (sender, _) = channel::channel(Arc::new(initial));
        Self { snapshots: Arc::new(sender) }
    }

    /// The snapshot in effect right now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<MockSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Replaces the served snapshot and notifies subscribers.
    pub fn publish(&self, snapshot: MockSnapshot) {
        self.snapshots.send_replace(Arc::new(snapshot));
    }

    /// Receives every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> channel::Receiver<Arc<MockSnapshot>> {
        self.snapshots.subscribe()
    }
}

/// Builds the router: the mock middleware in front of a 404 fallback.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(state, middleware::serve_mocks))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "no mock recorded", "path": uri.path()})))
}

/// Serves the router on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`Error::Server`] if the server stops with an I/O error.
pub async fn serve<F>(listener: TcpListener, state: ServerState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Server(e.to_string()))
}
