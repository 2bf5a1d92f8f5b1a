// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP relay-probe surface built on axum.
//!
//! A small operator-facing server for exercising the outbound relay path
//! without going through the mirror platform: `GET /relay/{user_id}/{message}`
//! pushes a probe event into the engine queue and reports whether delivery
//! to the origin platform succeeded. Disabled by default in configuration.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use relaydesk_config::model::GatewayConfig;
use relaydesk_core::types::UserId;
use relaydesk_core::{BridgeError, BridgeEvent};

/// How long a probe waits for the engine to report the delivery outcome.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Channel into the engine's event queue.
    pub events: mpsc::Sender<BridgeEvent>,
}

/// Response body for a successful probe.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: String,
    pub user_id: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /relay/{user_id}/{message}
///
/// Relays `message` to `user_id` on the origin platform and reports the
/// delivery outcome: 200 when delivered, 502 when the transport failed.
pub async fn get_relay(
    State(state): State<GatewayState>,
    Path((user_id, message)): Path<(String, String)>,
) -> Response {
    let (tx, rx) = oneshot::channel::<Result<(), BridgeError>>();
    let probe = BridgeEvent::RelayProbe {
        user_id: UserId(user_id.clone()),
        text: message,
        reply: tx,
    };

    if state.events.send(probe).await.is_err() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "engine not accepting events".to_string(),
            }),
        )
            .into_response();
    }

    match tokio::time::timeout(PROBE_TIMEOUT, rx).await {
        Ok(Ok(Ok(()))) => (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "delivered".to_string(),
                user_id,
            }),
        )
            .into_response(),
        Ok(Ok(Err(err))) => {
            warn!(user_id = %user_id, error = %err, "relay probe delivery failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("delivery failed: {err}"),
                }),
            )
                .into_response()
        }
        Ok(Err(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "reply channel closed".to_string(),
            }),
        )
            .into_response(),
        Err(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorResponse {
                error: "probe timeout".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health — liveness for process supervisors.
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the probe router. Split from [`start_server`] so tests can drive
/// it with `tower::ServiceExt` without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/relay/{user_id}/{message}", get(get_relay))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds to the configured host:port and serves the probe routes until the
/// process shuts down.
pub async fn start_server(
    config: &GatewayConfig,
    events: mpsc::Sender<BridgeEvent>,
) -> Result<(), BridgeError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("relay-probe gateway listening on {addr}");

    axum::serve(listener, router(GatewayState { events }))
        .await
        .map_err(|e| BridgeError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_event_carries_user_and_text() {
        let (tx, mut rx) = mpsc::channel(4);
        let state = GatewayState { events: tx };

        // Answer the probe as soon as it lands so get_relay returns.
        let responder = tokio::spawn(async move {
            match rx.recv().await {
                Some(BridgeEvent::RelayProbe {
                    user_id,
                    text,
                    reply,
                }) => {
                    assert_eq!(user_id.0, "12345");
                    assert_eq!(text, "ping");
                    let _ = reply.send(Ok(()));
                }
                other => panic!("expected RelayProbe, got {other:?}"),
            }
        });

        let response = get_relay(
            State(state),
            Path(("12345".to_string(), "ping".to_string())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn failed_delivery_maps_to_bad_gateway() {
        let (tx, mut rx) = mpsc::channel(4);
        let state = GatewayState { events: tx };

        let responder = tokio::spawn(async move {
            if let Some(BridgeEvent::RelayProbe { reply, .. }) = rx.recv().await {
                let _ = reply.send(Err(BridgeError::Transport {
                    message: "origin unreachable".to_string(),
                    source: None,
                }));
            }
        });

        let response = get_relay(
            State(state),
            Path(("12345".to_string(), "ping".to_string())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn closed_queue_maps_to_unavailable() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let state = GatewayState { events: tx };

        let response = get_relay(
            State(state),
            Path(("12345".to_string(), "ping".to_string())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn probe_response_serializes() {
        let resp = ProbeResponse {
            status: "delivered".to_string(),
            user_id: "42".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"delivered\""));
        assert!(json.contains("\"user_id\":\"42\""));
    }
}
