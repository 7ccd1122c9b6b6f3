// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

mod devices;
mod health;
mod metrics;

pub use devices::{browse_resource, create_device, delete_device, device_detail, index, list_devices};
pub use health::{HealthResponse, favicon, health_check};
pub use metrics::metrics_handler;
