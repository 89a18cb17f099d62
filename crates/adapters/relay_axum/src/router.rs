//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use crate::hub::RelayHub;

/// Build the top-level axum [`Router`].
///
/// `/ws` upgrades into a relay session; `/health` answers liveness
/// probes. A [`TraceLayer`] logs each request through the `tracing`
/// ecosystem.
pub fn build(hub: Arc<RelayHub>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", any(crate::ws::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(Arc::new(RelayHub::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_reject_plain_get_on_ws_route() {
        let app = build(Arc::new(RelayHub::new()));

        let response = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Without upgrade headers the handshake cannot proceed.
        assert_ne!(response.status(), StatusCode::OK);
    }
}
