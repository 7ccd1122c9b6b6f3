// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Type definitions for MikroTik devices and REST responses

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use url::Url;

use super::error::ClientError;

/// Username and password for a single device
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Where a device's REST API lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: false,
        }
    }

    #[must_use]
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Checks host and port without touching the network
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.port == 0 {
            return Err(ClientError::InvalidAddress {
                address: self.to_string(),
                reason: "port must be between 1 and 65535".to_string(),
            });
        }
        validate_host(&self.host).map_err(|reason| ClientError::InvalidAddress {
            address: self.to_string(),
            reason,
        })
    }

    /// Base URL of the REST API, always ending in `/rest/`
    pub fn base_url(&self) -> Result<Url, ClientError> {
        self.validate()?;
        let scheme = if self.use_tls { "https" } else { "http" };
        let host = self.host.trim();
        let host = if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        Url::parse(&format!("{scheme}://{host}:{}/rest/", self.port)).map_err(|e| {
            ClientError::InvalidAddress {
                address: self.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = self.host.trim();
        if host.parse::<Ipv6Addr>().is_ok() {
            write!(f, "[{host}]:{}", self.port)
        } else {
            write!(f, "{host}:{}", self.port)
        }
    }
}

/// Endpoint plus credentials: everything needed to talk to one device
#[derive(Debug, Clone)]
pub struct DeviceTarget {
    pub endpoint: DeviceEndpoint,
    pub credentials: Credentials,
}

/// Validates an IP literal or RFC 1123 host name
///
/// Dotted all-numeric names that do not parse as IPv4 (`300.1.1.1`, `10.1`)
/// are rejected instead of being treated as host names.
pub fn validate_host(host: &str) -> Result<(), String> {
    let host = host.trim();
    if host.is_empty() {
        return Err("address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if host.len() > 253 {
        return Err("host name is too long".to_string());
    }

    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    if labels
        .iter()
        .all(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_digit()))
    {
        return Err("invalid IP address".to_string());
    }
    for label in labels {
        if label.is_empty() || label.len() > 63 {
            return Err("invalid host name".to_string());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("invalid host name".to_string());
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("invalid host name".to_string());
        }
    }
    Ok(())
}

/// Canonical spelling of a validated host
///
/// IP literals are re-rendered (`2001:DB8:0:0::1` becomes `2001:db8::1`),
/// host names are lowercased without the trailing root dot.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    let host = host.trim();
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => host.trim_end_matches('.').to_ascii_lowercase(),
    }
}

/// One object of a RouterOS REST reply, values kept as strings
pub type Record = BTreeMap<String, String>;

/// Decoded result of a single REST call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: String,
    pub records: Vec<Record>,
}

impl Resource {
    /// Union of record keys; `.id` and `name` first, the rest sorted
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys.sort_by_key(|k| (column_rank(k), k.clone()));
        keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn column_rank(key: &str) -> u8 {
    match key {
        ".id" => 0,
        "name" => 1,
        _ => 2,
    }
}

/// System resource information from a `MikroTik` router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemResource {
    pub uptime: String,
    pub cpu_load: u64,
    pub free_memory: u64,
    pub total_memory: u64,
    pub version: String,
    pub board_name: String,
    pub architecture: String,
}

/// A network interface as reported by `/interface`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub kind: String,
    pub mac_address: Option<String>,
    pub running: bool,
    pub disabled: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub comment: Option<String>,
}

/// Result of a reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub identity: Option<String>,
    pub system: SystemResource,
}

/// System resource and interface list fetched together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub identity: Option<String>,
    pub system: SystemResource,
    pub interfaces: Vec<InterfaceInfo>,
    pub fetched_at: DateTime<Utc>,
}
