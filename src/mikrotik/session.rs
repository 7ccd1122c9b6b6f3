// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Authenticated session against one device's REST API

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use url::Url;

use super::error::ClientError;
use super::parse::{
    decode_device_error, decode_records, parse_identity, parse_interfaces, parse_system,
};
use super::retry::RetryPolicy;
use super::types::{Credentials, DeviceSnapshot, InterfaceInfo, Record, Resource, SystemResource};

/// Handle returned by [`MikroTikClient::connect`](super::MikroTikClient::connect)
///
/// Holds the device base URL and credentials; every call is a fresh,
/// independently retried GET over the shared HTTP client.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    http: reqwest::Client,
    base_url: Url,
    address: String,
    credentials: Credentials,
    retry: RetryPolicy,
    identity: Option<String>,
}

impl DeviceSession {
    pub(super) fn new(
        http: reqwest::Client,
        base_url: Url,
        address: String,
        credentials: Credentials,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            base_url,
            address,
            credentials,
            retry,
            identity: None,
        }
    }

    pub(super) fn set_identity(&mut self, identity: Option<String>) {
        self.identity = identity;
    }

    /// `host:port` of the device
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// `/system/identity` name read while connecting
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Reads a REST resource such as `interface` or `ip/address`
    ///
    /// # Errors
    ///
    /// `Auth` on 401/403, `Device` on other error statuses, `Protocol` on
    /// malformed bodies and `Connection` once the retry budget is spent.
    pub async fn fetch_resource(&self, path: &str) -> Result<Resource, ClientError> {
        let path = normalize_path(path)?;
        let url = self
            .base_url
            .join(&path)
            .map_err(|_| ClientError::InvalidPath { path: path.clone() })?;

        let records = self
            .retry
            .run(&self.address, || self.get_once(url.clone()))
            .await?;

        tracing::trace!(
            "Fetched {} record(s) from {} /rest/{}",
            records.len(),
            self.address,
            path
        );
        Ok(Resource { path, records })
    }

    async fn get_once(&self, url: Url) -> Result<Vec<Record>, ClientError> {
        tracing::trace!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&self.address, &e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Auth {
                address: self.address.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::from_transport(&self.address, &e))?;

        if !status.is_success() {
            return Err(decode_device_error(&self.address, status.as_u16(), &body));
        }

        decode_records(&self.address, &body)
    }

    pub async fn system_resource(&self) -> Result<SystemResource, ClientError> {
        let resource = self.fetch_resource("system/resource").await?;
        Ok(parse_system(&resource.records))
    }

    pub async fn interfaces(&self) -> Result<Vec<InterfaceInfo>, ClientError> {
        let resource = self.fetch_resource("interface").await?;
        Ok(parse_interfaces(&resource.records))
    }

    pub async fn identity_name(&self) -> Result<Option<String>, ClientError> {
        let resource = self.fetch_resource("system/identity").await?;
        Ok(parse_identity(&resource.records))
    }

    /// System resource and interfaces in one go
    pub async fn snapshot(&self) -> Result<DeviceSnapshot, ClientError> {
        let system = self.system_resource().await?;
        let interfaces = self.interfaces().await?;
        Ok(DeviceSnapshot {
            identity: self.identity.clone(),
            system,
            interfaces,
            fetched_at: chrono::Utc::now(),
        })
    }
}

/// Trims slashes and rejects paths that could escape `/rest/`
pub(crate) fn normalize_path(path: &str) -> Result<String, ClientError> {
    let trimmed = path.trim().trim_matches('/');
    let invalid = || ClientError::InvalidPath {
        path: path.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }
    if trimmed.contains(['?', '#', '\\', ':']) || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}
