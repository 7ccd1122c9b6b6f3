// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metrics registry and update logic

use std::sync::Arc;

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tokio::sync::Mutex;

use crate::metrics::labels::{DeviceLabels, RequestLabels};
use crate::metrics::parsers::parse_uptime_to_seconds;
use crate::mikrotik::SystemResource;

/// Every value the `outcome` label can take
pub const OUTCOMES: [&str; 6] = [
    "success",
    "invalid_request",
    "connection_error",
    "auth_error",
    "device_error",
    "protocol_error",
];

#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Mutex<Registry>>,
    devices_registered: Gauge,
    device_requests: Family<RequestLabels, Counter>,
    device_request_duration_milliseconds: Family<DeviceLabels, Gauge>,
    device_uptime_seconds: Family<DeviceLabels, Gauge>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let devices_registered = Gauge::default();
        registry.register(
            "mikrotik_devices_registered",
            "Number of devices in the registry",
            devices_registered.clone(),
        );
        let device_requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "mikrotik_device_requests",
            "Device REST calls by outcome",
            device_requests.clone(),
        );
        let device_request_duration_milliseconds = Family::<DeviceLabels, Gauge>::default();
        registry.register(
            "mikrotik_device_request_duration_milliseconds",
            "Duration of the last device REST call including retries",
            device_request_duration_milliseconds.clone(),
        );
        let device_uptime_seconds = Family::<DeviceLabels, Gauge>::default();
        registry.register(
            "mikrotik_device_uptime_seconds",
            "Device uptime reported by /system/resource",
            device_uptime_seconds.clone(),
        );

        Self {
            registry: Arc::new(Mutex::new(registry)),
            devices_registered,
            device_requests,
            device_request_duration_milliseconds,
            device_uptime_seconds,
        }
    }

    pub async fn encode_metrics(&self) -> Result<String, std::fmt::Error> {
        let registry = self.registry.lock().await;
        let mut buffer = String::new();
        encode(&mut buffer, &registry)?;
        Ok(buffer)
    }

    pub fn set_devices_registered(&self, count: usize) {
        self.devices_registered
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Records one device call; `outcome` is one of [`OUTCOMES`]
    pub fn record_request(&self, device: &str, outcome: &str, duration_secs: f64) {
        self.device_requests
            .get_or_create(&RequestLabels {
                device: device.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();

        #[allow(clippy::cast_possible_truncation)]
        let millis = (duration_secs * 1000.0).round() as i64;
        self.device_request_duration_milliseconds
            .get_or_create(&DeviceLabels {
                device: device.to_string(),
            })
            .set(millis);
    }

    pub fn update_system(&self, device: &str, system: &SystemResource) {
        let uptime = parse_uptime_to_seconds(&system.uptime);
        self.device_uptime_seconds
            .get_or_create(&DeviceLabels {
                device: device.to_string(),
            })
            .set(i64::try_from(uptime).unwrap_or(i64::MAX));
    }

    /// Drops every series of a removed device
    pub fn remove_device(&self, device: &str) {
        let labels = DeviceLabels {
            device: device.to_string(),
        };
        self.device_request_duration_milliseconds.remove(&labels);
        self.device_uptime_seconds.remove(&labels);
        for outcome in OUTCOMES {
            self.device_requests.remove(&RequestLabels {
                device: device.to_string(),
                outcome: outcome.to_string(),
            });
        }
        tracing::debug!("Removed metrics for device {}", device);
    }
}
