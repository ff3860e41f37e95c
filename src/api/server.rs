// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::api::metrics::ServerMetrics;
use crate::common::error::AppError;
use crate::infrastructure::storage::ImageStore;
use crate::network::explorer::{ExplorerClient, ExplorerStats};
use crate::services::notify::{OrderDetails, OrderResponse, build_order_link};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub store: ImageStore,
    pub explorer: ExplorerClient,
    pub metrics: ServerMetrics,
}

impl AppState {
    pub fn new(store: ImageStore, explorer: ExplorerClient) -> Self {
        Self {
            store,
            explorer,
            metrics: ServerMetrics::default(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    // Headroom so oversized bodies reach the store and get a JSON error.
    let upload_limit = state.store.max_bytes().saturating_add(1024);
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/stats", get(stats))
        .route("/functions/v1/send-whatsapp-order", post(send_whatsapp_order))
        .route(
            "/storage/v1/object/{name}",
            put(upload_object).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/storage/v1/object/public/{name}", get(get_object))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve in the background; returns the bound address.
pub async fn spawn_server(
    bind: &str,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<SocketAddr, AppError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Initialization(format!("API server failed to bind {bind}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| AppError::Initialization(format!("API server address: {e}")))?;
    tracing::info!(target: "api", addr = %local, "API server listening");

    let app = router(state);
    tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
        if let Err(e) = served {
            tracing::error!(target: "api", error = %e, "API server stopped");
        }
    });
    Ok(local)
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation { .. } | AppError::Storage(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<ExplorerStats> {
    ServerMetrics::inc(&state.metrics.stats_served);
    Json(state.explorer.stats().await)
}

async fn send_whatsapp_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderDetails>, JsonRejection>,
) -> (StatusCode, Json<OrderResponse>) {
    let order = match payload {
        Ok(Json(order)) => order,
        Err(rejection) => {
            ServerMetrics::inc(&state.metrics.orders_rejected);
            tracing::warn!(target: "api", error = %rejection.body_text(), "Malformed order body");
            return (
                StatusCode::BAD_REQUEST,
                Json(OrderResponse::failed(rejection.body_text())),
            );
        }
    };

    match build_order_link(&order) {
        Ok(url) => {
            ServerMetrics::inc(&state.metrics.orders_sent);
            tracing::info!(
                target: "api",
                item = %order.item_name,
                tx = %order.tx_hash,
                "Order link prepared"
            );
            (StatusCode::OK, Json(OrderResponse::ok(url)))
        }
        Err(e) => {
            ServerMetrics::inc(&state.metrics.orders_rejected);
            tracing::warn!(target: "api", error = %e, "Order rejected");
            (StatusCode::BAD_REQUEST, Json(OrderResponse::failed(e.user_message())))
        }
    }
}

async fn upload_object(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match state.store.put(&name, content_type, &body).await {
        Ok(stored) => {
            ServerMetrics::inc(&state.metrics.uploads_stored);
            (StatusCode::OK, Json(stored)).into_response()
        }
        Err(e) => {
            ServerMetrics::inc(&state.metrics.uploads_rejected);
            tracing::warn!(target: "api", name = %name, error = %e, "Upload rejected");
            (status_for(&e), Json(json!({ "error": e.user_message() }))).into_response()
        }
    }
}

async fn get_object(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.store.get(&name).await {
        Ok(Some((bytes, content_type))) => {
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
        Err(e) => (status_for(&e), Json(json!({ "error": e.user_message() }))).into_response(),
    }
}
