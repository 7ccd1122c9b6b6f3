// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTTP layer of the MikroTik Web UI
//!
//! Serves the htmx page and fragments plus the operational endpoints.
//!
//! # Endpoints
//! - `GET /`: full page
//! - `GET /devices`, `POST /devices`: device list fragment, add device
//! - `GET /devices/{id}`, `DELETE /devices/{id}`: live detail, remove
//! - `GET /devices/{id}/rest/{*path}`: any read-only REST resource
//! - `GET /health`: health check
//! - `GET /metrics`: Prometheus metrics

pub mod handlers;
mod state;
pub mod views;

use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;

pub use state::AppState;

/// Creates the main Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/devices",
            get(handlers::list_devices).post(handlers::create_device),
        )
        .route(
            "/devices/{id}",
            get(handlers::device_detail).delete(handlers::delete_device),
        )
        .route("/devices/{id}/rest/{*path}", get(handlers::browse_resource))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/favicon.ico", get(handlers::favicon))
        .with_state(state)
}
