// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Device registry
//!
//! In-memory catalog of the devices the operator has added. Mutations take
//! the write lock for the whole check-then-insert, so the one-entry-per-address
//! invariant holds under concurrent requests.

mod device;


use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::mikrotik::{DeviceSnapshot, ProbeReport, canonical_host, validate_host};

pub use device::{Device, DeviceId, DeviceMetadata, DeviceStatus, NewDevice};

/// Registry misuse
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Device with address '{0}' already exists")]
    Duplicate(String),

    #[error("Device '{0}' not found")]
    NotFound(DeviceId),

    #[error("Invalid device: {0}")]
    InvalidInput(String),
}

/// Successful device call to record against an entry
#[derive(Debug, Clone)]
pub enum Observation<'a> {
    Probe(&'a ProbeReport),
    Snapshot(&'a DeviceSnapshot),
    /// Any other successful call; only refreshes status and access time
    Reachable,
}

/// Shared device catalog, cheap to clone
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    devices: Arc<RwLock<Vec<Device>>>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device and returns its id
    ///
    /// The host is stored in canonical form, so every spelling of one
    /// address maps to the same entry.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed address, port or username,
    /// `Duplicate` when the address is already registered.
    pub async fn add_device(&self, mut new: NewDevice) -> Result<DeviceId, RegistryError> {
        new.endpoint.host = new.endpoint.host.trim().to_string();
        validate_host(&new.endpoint.host).map_err(|reason| {
            RegistryError::InvalidInput(format!("address '{}': {reason}", new.endpoint.host))
        })?;
        new.endpoint.host = canonical_host(&new.endpoint.host);
        if new.endpoint.port == 0 {
            return Err(RegistryError::InvalidInput(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if new.credentials.username.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "username cannot be empty".to_string(),
            ));
        }

        let mut devices = self.devices.write().await;
        if devices
            .iter()
            .any(|d| d.matches_address(&new.endpoint.host))
        {
            tracing::debug!("Rejecting duplicate device {}", new.endpoint.host);
            return Err(RegistryError::Duplicate(new.endpoint.host));
        }

        let device = Device::new(new);
        let id = device.id;
        tracing::info!("Registered device {} at {}", id, device.endpoint);
        devices.push(device);
        Ok(id)
    }

    /// All devices in insertion order
    pub async fn list_devices(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, RegistryError> {
        self.devices
            .read()
            .await
            .iter()
            .find(|d| d.id == *id)
            .cloned()
            .ok_or(RegistryError::NotFound(*id))
    }

    /// Removes a device and returns the removed entry
    ///
    /// A repeated removal of the same id fails with `NotFound` and leaves
    /// the registry untouched.
    pub async fn remove_device(&self, id: &DeviceId) -> Result<Device, RegistryError> {
        let mut devices = self.devices.write().await;
        let pos = devices
            .iter()
            .position(|d| d.id == *id)
            .ok_or(RegistryError::NotFound(*id))?;
        let removed = devices.remove(pos);
        tracing::info!("Removed device {} at {}", removed.id, removed.endpoint);
        Ok(removed)
    }

    /// Records a successful device call
    pub async fn record_success(
        &self,
        id: &DeviceId,
        observation: Observation<'_>,
    ) -> Result<(), RegistryError> {
        let mut devices = self.devices.write().await;
        let device = devices
            .iter_mut()
            .find(|d| d.id == *id)
            .ok_or(RegistryError::NotFound(*id))?;

        match observation {
            Observation::Probe(report) => device.metadata.merge_probe(report),
            Observation::Snapshot(snapshot) => {
                device.metadata.merge_snapshot(snapshot);
                device.snapshot = Some(snapshot.clone());
            }
            Observation::Reachable => {}
        }
        device.status = DeviceStatus::Online;
        device.consecutive_failures = 0;
        device.last_accessed = Some(Utc::now());
        Ok(())
    }

    /// Records a failed device call
    pub async fn record_failure(
        &self,
        id: &DeviceId,
        status: DeviceStatus,
    ) -> Result<(), RegistryError> {
        let mut devices = self.devices.write().await;
        let device = devices
            .iter_mut()
            .find(|d| d.id == *id)
            .ok_or(RegistryError::NotFound(*id))?;

        device.consecutive_failures = device.consecutive_failures.saturating_add(1);
        tracing::trace!(
            "Device {} failure recorded, consecutive failures: {}",
            device.endpoint,
            device.consecutive_failures
        );
        device.status = status;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}
