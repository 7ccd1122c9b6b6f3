// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Application service layer
//!
//! Orchestrates registry lookups and device calls for each user action and
//! turns client failures into messages that are safe to render.


use std::sync::Arc;
use std::time::Instant;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::{DeviceConfig, MikrotikSettings};
use crate::error::Result;
use crate::metrics::MetricsRegistry;
use crate::mikrotik::{
    ClientError, Credentials, DeviceApi, DeviceEndpoint, DeviceSnapshot, Resource,
};
use crate::registry::{
    Device, DeviceId, DeviceRegistry, DeviceStatus, NewDevice, Observation, RegistryError,
};

/// "Add device" form as submitted by the browser
///
/// Empty fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// A device together with the outcome of a live call
#[derive(Debug, Clone)]
pub struct DeviceView<T> {
    pub device: Device,
    /// Fetched data, or the user-facing reason it could not be fetched
    pub data: std::result::Result<T, String>,
}

/// Defaults applied to devices added without explicit settings
#[derive(Debug, Clone)]
struct DeviceDefaults {
    port: u16,
    username: String,
    password: SecretString,
    use_tls: bool,
}

impl From<&MikrotikSettings> for DeviceDefaults {
    fn from(settings: &MikrotikSettings) -> Self {
        Self {
            port: settings.default_port,
            username: settings.username.clone(),
            password: settings.password.clone(),
            use_tls: settings.use_tls,
        }
    }
}

#[derive(Clone)]
pub struct DeviceService {
    registry: DeviceRegistry,
    client: Arc<dyn DeviceApi>,
    metrics: MetricsRegistry,
    defaults: DeviceDefaults,
}

impl DeviceService {
    pub fn new(
        registry: DeviceRegistry,
        client: Arc<dyn DeviceApi>,
        metrics: MetricsRegistry,
        settings: &MikrotikSettings,
    ) -> Self {
        Self {
            registry,
            client,
            metrics,
            defaults: DeviceDefaults::from(settings),
        }
    }

    /// Validates the form, registers the device and probes it
    ///
    /// A failed probe does not undo the registration; it only sets the
    /// device status.
    ///
    /// # Errors
    ///
    /// Registry errors (`InvalidInput`, `Duplicate`).
    pub async fn add_device(&self, form: DeviceForm) -> Result<Device> {
        let new = self.new_device_from_form(&form)?;
        let id = self.registry.add_device(new).await?;
        self.metrics
            .set_devices_registered(self.registry.len().await);

        let device = self.registry.get_device(&id).await?;
        self.probe(&device).await;
        Ok(self.registry.get_device(&id).await?)
    }

    fn new_device_from_form(&self, form: &DeviceForm) -> Result<NewDevice> {
        let port = match form.port.trim() {
            "" => self.defaults.port,
            raw => raw.parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(|| {
                RegistryError::InvalidInput(format!("port '{raw}' must be between 1 and 65535"))
            })?,
        };
        let username = match form.username.trim() {
            "" => self.defaults.username.clone(),
            name => name.to_string(),
        };
        let password = if form.password.is_empty() {
            self.defaults.password.expose_secret().to_string()
        } else {
            form.password.clone()
        };

        Ok(NewDevice {
            endpoint: DeviceEndpoint::new(form.address.trim(), port)
                .with_tls(self.defaults.use_tls),
            credentials: Credentials::new(username, password),
        })
    }

    /// Best-effort reachability check, recorded as device status
    async fn probe(&self, device: &Device) {
        let start = Instant::now();
        let result = self.client.probe(&device.target()).await;
        self.observe(device, start, result.as_ref().err());

        let recorded = match &result {
            Ok(report) => {
                self.metrics.update_system(device.address(), &report.system);
                tracing::info!(
                    "Device {} is online (board: {}, RouterOS {})",
                    device.endpoint,
                    report.system.board_name,
                    report.system.version
                );
                self.registry
                    .record_success(&device.id, Observation::Probe(report))
                    .await
            }
            Err(e) => {
                tracing::warn!("Initial probe of {} failed: {}", device.endpoint, e);
                self.registry
                    .record_failure(&device.id, DeviceStatus::from_error(e))
                    .await
            }
        };
        if let Err(e) = recorded {
            tracing::debug!("Probe result for {} dropped: {}", device.id, e);
        }
    }

    pub async fn list_devices(&self) -> Vec<Device> {
        self.registry.list_devices().await
    }

    pub async fn get_device(&self, id: &DeviceId) -> Result<Device> {
        Ok(self.registry.get_device(id).await?)
    }

    /// Fetches live system and interface data for one device
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is unknown. Device failures are returned in
    /// [`DeviceView::data`] instead.
    pub async fn view_device(&self, id: &DeviceId) -> Result<DeviceView<DeviceSnapshot>> {
        let device = self.registry.get_device(id).await?;

        let start = Instant::now();
        let result = self.client.fetch_snapshot(&device.target()).await;
        self.observe(&device, start, result.as_ref().err());

        let data = match result {
            Ok(snapshot) => {
                self.metrics
                    .update_system(device.address(), &snapshot.system);
                self.record(&device, Ok(Observation::Snapshot(&snapshot)))
                    .await;
                Ok(snapshot)
            }
            Err(e) => {
                self.record(&device, Err(&e)).await;
                Err(e.user_message())
            }
        };

        let device = self.registry.get_device(id).await.unwrap_or(device);
        Ok(DeviceView { device, data })
    }

    /// Reads an arbitrary REST resource (e.g. `ip/address`) from a device
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is unknown.
    pub async fn browse_resource(&self, id: &DeviceId, path: &str) -> Result<DeviceView<Resource>> {
        let device = self.registry.get_device(id).await?;

        let start = Instant::now();
        let result = self.client.fetch_resource(&device.target(), path).await;
        self.observe(&device, start, result.as_ref().err());

        let data = match result {
            Ok(resource) => {
                self.record(&device, Ok(Observation::Reachable)).await;
                Ok(resource)
            }
            Err(ClientError::InvalidPath { path }) => {
                // rejected locally, says nothing about the device
                Err(format!("Invalid resource path '{path}'"))
            }
            Err(e) => {
                self.record(&device, Err(&e)).await;
                Err(e.user_message())
            }
        };

        let device = self.registry.get_device(id).await.unwrap_or(device);
        Ok(DeviceView { device, data })
    }

    /// # Errors
    ///
    /// `NotFound` when the id is unknown or already removed.
    pub async fn remove_device(&self, id: &DeviceId) -> Result<Device> {
        let removed = self.registry.remove_device(id).await?;
        self.metrics.remove_device(removed.address());
        self.metrics
            .set_devices_registered(self.registry.len().await);
        Ok(removed)
    }

    /// Registers devices listed in `DEVICES_CONFIG`; returns how many were added
    pub async fn seed_devices(&self, devices: &[DeviceConfig]) -> usize {
        let mut added = 0;
        for config in devices {
            let form = DeviceForm {
                address: config.address.clone(),
                port: config.port.map(|p| p.to_string()).unwrap_or_default(),
                username: config.username.clone().unwrap_or_default(),
                password: config
                    .password
                    .as_ref()
                    .map(|p| p.expose_secret().to_string())
                    .unwrap_or_default(),
            };
            match self.add_device(form).await {
                Ok(device) => {
                    added += 1;
                    tracing::info!(
                        "  - Device {} ({})",
                        device.endpoint,
                        device.status.label()
                    );
                }
                Err(e) => tracing::warn!("Skipping configured device {}: {}", config.address, e),
            }
        }
        added
    }

    fn observe(&self, device: &Device, start: Instant, error: Option<&ClientError>) {
        let duration = start.elapsed().as_secs_f64();
        let outcome = error.map_or("success", ClientError::outcome_label);
        self.metrics
            .record_request(device.address(), outcome, duration);
        tracing::debug!(
            "Device call to {} finished in {:.3}s: {}",
            device.endpoint,
            duration,
            outcome
        );
    }

    async fn record(
        &self,
        device: &Device,
        outcome: std::result::Result<Observation<'_>, &ClientError>,
    ) {
        let recorded = match outcome {
            Ok(observation) => self.registry.record_success(&device.id, observation).await,
            Err(e) => {
                tracing::warn!("Call to device {} failed: {}", device.endpoint, e);
                self.registry
                    .record_failure(&device.id, DeviceStatus::from_error(e))
                    .await
            }
        };
        if let Err(e) = recorded {
            // removed while the call was in flight
            tracing::debug!("Result for {} dropped: {}", device.id, e);
        }
    }
}
