// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Device entries kept by the registry

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::mikrotik::{
    ClientError, Credentials, DeviceEndpoint, DeviceSnapshot, DeviceTarget, ProbeReport,
};

/// Opaque device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DeviceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Last known reachability of a device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    /// Never probed
    #[default]
    Unknown,
    Online,
    Unreachable(String),
    AuthFailed(String),
    /// Device-reported fault or malformed reply
    Faulty(String),
}

impl DeviceStatus {
    /// Status implied by a failed device call
    #[must_use]
    pub fn from_error(error: &ClientError) -> Self {
        let reason = error.user_message();
        match error {
            ClientError::Connection { .. } => Self::Unreachable(reason),
            ClientError::Auth { .. } => Self::AuthFailed(reason),
            ClientError::InvalidAddress { .. }
            | ClientError::InvalidPath { .. }
            | ClientError::Device { .. }
            | ClientError::Protocol { .. } => Self::Faulty(reason),
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Online => "online",
            Self::Unreachable(_) => "unreachable",
            Self::AuthFailed(_) => "auth-failed",
            Self::Faulty(_) => "error",
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unknown | Self::Online => None,
            Self::Unreachable(r) | Self::AuthFailed(r) | Self::Faulty(r) => Some(r),
        }
    }
}

/// Cached, rarely changing facts about a device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    pub identity: Option<String>,
    pub board_name: Option<String>,
    pub version: Option<String>,
}

impl DeviceMetadata {
    pub(crate) fn merge_probe(&mut self, report: &ProbeReport) {
        if report.identity.is_some() {
            self.identity.clone_from(&report.identity);
        }
        self.board_name = Some(report.system.board_name.clone());
        self.version = Some(report.system.version.clone());
    }

    pub(crate) fn merge_snapshot(&mut self, snapshot: &DeviceSnapshot) {
        if snapshot.identity.is_some() {
            self.identity.clone_from(&snapshot.identity);
        }
        self.board_name = Some(snapshot.system.board_name.clone());
        self.version = Some(snapshot.system.version.clone());
    }
}

/// Input for [`DeviceRegistry::add_device`](super::DeviceRegistry::add_device)
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub endpoint: DeviceEndpoint,
    pub credentials: Credentials,
}

/// A registered device
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    pub endpoint: DeviceEndpoint,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub status: DeviceStatus,
    pub consecutive_failures: u32,
    pub metadata: DeviceMetadata,
    pub snapshot: Option<DeviceSnapshot>,
}

impl Device {
    pub(crate) fn new(new: NewDevice) -> Self {
        Self {
            id: DeviceId::new(),
            endpoint: new.endpoint,
            credentials: new.credentials,
            created_at: Utc::now(),
            last_accessed: None,
            status: DeviceStatus::Unknown,
            consecutive_failures: 0,
            metadata: DeviceMetadata::default(),
            snapshot: None,
        }
    }

    /// Host part of the endpoint, the registry uniqueness key
    #[must_use]
    pub fn address(&self) -> &str {
        &self.endpoint.host
    }

    #[must_use]
    pub fn target(&self) -> DeviceTarget {
        DeviceTarget {
            endpoint: self.endpoint.clone(),
            credentials: self.credentials.clone(),
        }
    }

    pub(crate) fn matches_address(&self, address: &str) -> bool {
        self.endpoint.host.eq_ignore_ascii_case(address)
    }
}
