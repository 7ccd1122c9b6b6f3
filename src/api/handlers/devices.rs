// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Device pages and htmx fragments

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::api::views::{self, Notice};
use crate::error::AppError;
use crate::registry::{DeviceId, RegistryError};
use crate::service::DeviceForm;

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let devices = state.service.list_devices().await;
    Html(views::index_page(&devices))
}

/// GET /devices
pub async fn list_devices(State(state): State<Arc<AppState>>) -> Html<String> {
    let devices = state.service.list_devices().await;
    Html(views::device_list(&devices, None))
}

/// POST /devices
///
/// Invalid input and duplicates are reported inline with status 200 so htmx
/// still swaps the list in.
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeviceForm>,
) -> Html<String> {
    let address = form.address.trim().to_string();
    let notice = match state.service.add_device(form).await {
        Ok(device) => match device.status.reason() {
            Some(reason) => Notice::Success(format!(
                "Device {} added, but it did not respond: {reason}",
                device.endpoint
            )),
            None => Notice::Success(format!("Device {} added", device.endpoint)),
        },
        Err(e) => {
            tracing::debug!("Add device '{}' rejected: {}", address, e);
            Notice::Error(e.user_message())
        }
    };

    let devices = state.service.list_devices().await;
    Html(views::device_list(&devices, Some(&notice)))
}

/// GET /devices/{id}
pub async fn device_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Ok(device_id) = id.parse::<DeviceId>() else {
        return not_found(&id);
    };
    match state.service.view_device(&device_id).await {
        Ok(view) => Html(views::device_detail(&view)).into_response(),
        Err(e) => fragment_error(&id, &e),
    }
}

/// GET /devices/{id}/rest/{*path}
pub async fn browse_resource(
    State(state): State<Arc<AppState>>,
    Path((id, path)): Path<(String, String)>,
) -> Response {
    let Ok(device_id) = id.parse::<DeviceId>() else {
        return not_found(&id);
    };
    match state.service.browse_resource(&device_id, &path).await {
        Ok(view) => Html(views::resource_view(&view, &path)).into_response(),
        Err(e) => fragment_error(&id, &e),
    }
}

/// DELETE /devices/{id}
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let result = match id.parse::<DeviceId>() {
        Ok(device_id) => state.service.remove_device(&device_id).await,
        Err(_) => Err(RegistryError::InvalidInput(format!("malformed device id '{id}'")).into()),
    };

    let (status, notice) = match result {
        Ok(device) => (
            StatusCode::OK,
            Notice::Success(format!("Device {} removed", device.endpoint)),
        ),
        Err(e) => {
            tracing::debug!("Remove device '{}' failed: {}", id, e);
            (StatusCode::NOT_FOUND, Notice::Error(format!("Device '{id}' not found")))
        }
    };

    let devices = state.service.list_devices().await;
    (status, Html(views::device_list(&devices, Some(&notice)))).into_response()
}

fn not_found(id: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found(id))).into_response()
}

fn fragment_error(id: &str, error: &AppError) -> Response {
    if error.is_not_found() {
        return not_found(id);
    }
    tracing::error!("Request for device '{}' failed: {}", id, error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::detail_error(&error.user_message())),
    )
        .into_response()
}
