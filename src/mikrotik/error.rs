// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Failure taxonomy of the RouterOS REST client

use thiserror::Error;

/// Error returned by device calls
///
/// `address` is always `host:port`; credentials never appear in any variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Address is empty or not a valid IP / host name
    #[error("Invalid device address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Resource path cannot be turned into a REST URL
    #[error("Invalid resource path '{path}'")]
    InvalidPath { path: String },

    /// Network-level failure: timeout, refusal, DNS
    #[error("Failed to connect to device {address}: {message}")]
    Connection { address: String, message: String },

    /// Credentials rejected (HTTP 401/403)
    #[error("Device {address} rejected credentials (HTTP {status})")]
    Auth { address: String, status: u16 },

    /// Device answered with an error status or error payload
    #[error("Device {address} returned HTTP {status}: {message}")]
    Device {
        address: String,
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// Response body is not the JSON shape RouterOS REST produces
    #[error("Unexpected response from device {address}: {message}")]
    Protocol { address: String, message: String },
}

impl ClientError {
    /// Returns `true` for failures worth retrying: connectivity problems and
    /// gateway-style statuses from devices behind a proxy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Device { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Short outcome name used as a metrics label
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } | Self::InvalidPath { .. } => "invalid_request",
            Self::Connection { .. } => "connection_error",
            Self::Auth { .. } => "auth_error",
            Self::Device { .. } => "device_error",
            Self::Protocol { .. } => "protocol_error",
        }
    }

    /// Message rendered to the operator
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAddress { address, reason } => {
                format!("Invalid device address '{address}': {reason}")
            }
            Self::InvalidPath { path } => format!("Invalid resource path '{path}'"),
            Self::Connection { address, message } => {
                format!("Device {address} is unreachable: {message}")
            }
            Self::Auth { address, .. } => {
                format!("Authentication failed for device {address}: check username and password")
            }
            Self::Device {
                address,
                message,
                detail,
                ..
            } => match detail {
                Some(detail) if !detail.is_empty() => {
                    format!("Device {address} reported an error: {message} ({detail})")
                }
                _ => format!("Device {address} reported an error: {message}"),
            },
            Self::Protocol { address, .. } => {
                format!("Device {address} sent an unexpected response")
            }
        }
    }

    /// Builds a [`ClientError`] from a transport failure
    ///
    /// Every transport failure is a `Connection` error, including a body
    /// cut off mid-transfer. `Protocol` is reserved for complete bodies
    /// that do not decode.
    pub(crate) fn from_transport(address: &str, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_body() || error.is_decode() {
            format!("response body interrupted: {}", root_cause(error))
        } else {
            root_cause(error)
        };
        Self::Connection {
            address: address.to_string(),
            message,
        }
    }
}

/// Innermost error message of a source chain
fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_error(status: u16) -> ClientError {
        ClientError::Device {
            address: "10.0.0.1:80".to_string(),
            status,
            message: "Bad Gateway".to_string(),
            detail: None,
        }
    }

    #[test]
    fn test_transient_classification() {
        let conn = ClientError::Connection {
            address: "10.0.0.1:80".to_string(),
            message: "refused".to_string(),
        };
        assert!(conn.is_transient());
        assert!(device_error(502).is_transient());
        assert!(device_error(503).is_transient());
        assert!(device_error(504).is_transient());
        assert!(!device_error(500).is_transient());
        assert!(!device_error(400).is_transient());

        let auth = ClientError::Auth {
            address: "10.0.0.1:80".to_string(),
            status: 401,
        };
        assert!(!auth.is_transient());

        let protocol = ClientError::Protocol {
            address: "10.0.0.1:80".to_string(),
            message: "not json".to_string(),
        };
        assert!(!protocol.is_transient());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(device_error(500).outcome_label(), "device_error");
        assert_eq!(
            ClientError::InvalidPath {
                path: "..".to_string()
            }
            .outcome_label(),
            "invalid_request"
        );
    }

    #[test]
    fn test_device_error_message_includes_detail() {
        let err = ClientError::Device {
            address: "10.0.0.1:80".to_string(),
            status: 400,
            message: "Bad Request".to_string(),
            detail: Some("no such command".to_string()),
        };
        assert_eq!(
            err.user_message(),
            "Device 10.0.0.1:80 reported an error: Bad Request (no such command)"
        );
    }

    #[test]
    fn test_protocol_message_hides_raw_body() {
        let err = ClientError::Protocol {
            address: "10.0.0.1:80".to_string(),
            message: "expected JSON, got '<html>'".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Device 10.0.0.1:80 sent an unexpected response"
        );
    }
}
