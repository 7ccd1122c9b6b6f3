// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! High-level MikroTik REST client

use std::time::Duration;

use async_trait::async_trait;

use crate::config::MikrotikSettings;

use super::error::ClientError;
use super::retry::RetryPolicy;
use super::session::{DeviceSession, normalize_path};
use super::types::{
    Credentials, DeviceEndpoint, DeviceSnapshot, DeviceTarget, ProbeReport, Resource,
};

/// Connect timeout for the TCP/TLS handshake (5 seconds)
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Device operations the service layer depends on
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Lightweight reachability check: identity plus system resource
    async fn probe(&self, target: &DeviceTarget) -> Result<ProbeReport, ClientError>;

    /// System resource and interface list
    async fn fetch_snapshot(&self, target: &DeviceTarget) -> Result<DeviceSnapshot, ClientError>;

    /// Arbitrary read-only REST resource
    async fn fetch_resource(
        &self,
        target: &DeviceTarget,
        path: &str,
    ) -> Result<Resource, ClientError>;
}

/// `MikroTik` `RouterOS` REST API client
///
/// Owns one pooled `reqwest::Client` shared by every device session.
#[derive(Debug, Clone)]
pub struct MikroTikClient {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl MikroTikClient {
    /// Creates a client from application settings
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(settings: &MikrotikSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout))
            // RouterOS ships self-signed certificates for www-ssl
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("mikrotik-webui/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            retry: RetryPolicy::new(settings.max_retries, settings.retry_base_delay),
        })
    }

    /// Creates a client around a pre-built `reqwest::Client`
    #[must_use]
    pub fn with_http(http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    /// Opens a session: validates the address and reads `/system/identity`
    ///
    /// # Errors
    ///
    /// `InvalidAddress` for malformed endpoints, `Connection` when the device
    /// cannot be reached, `Auth` when credentials are rejected.
    pub async fn connect(
        &self,
        endpoint: &DeviceEndpoint,
        credentials: &Credentials,
    ) -> Result<DeviceSession, ClientError> {
        let base_url = endpoint.base_url()?;
        let address = endpoint.to_string();
        tracing::debug!(
            "Connecting to device {} as '{}'",
            address,
            credentials.username
        );

        let mut session = DeviceSession::new(
            self.http.clone(),
            base_url,
            address,
            credentials.clone(),
            self.retry.clone(),
        );
        let identity = session.identity_name().await?;
        tracing::trace!("Device {} identity: {:?}", session.address(), identity);
        session.set_identity(identity);
        Ok(session)
    }
}

#[async_trait]
impl DeviceApi for MikroTikClient {
    async fn probe(&self, target: &DeviceTarget) -> Result<ProbeReport, ClientError> {
        let session = self.connect(&target.endpoint, &target.credentials).await?;
        let system = session.system_resource().await?;
        Ok(ProbeReport {
            identity: session.identity().map(str::to_string),
            system,
        })
    }

    async fn fetch_snapshot(&self, target: &DeviceTarget) -> Result<DeviceSnapshot, ClientError> {
        let session = self.connect(&target.endpoint, &target.credentials).await?;
        session.snapshot().await
    }

    async fn fetch_resource(
        &self,
        target: &DeviceTarget,
        path: &str,
    ) -> Result<Resource, ClientError> {
        normalize_path(path)?;
        let session = self.connect(&target.endpoint, &target.credentials).await?;
        session.fetch_resource(path).await
    }
}
