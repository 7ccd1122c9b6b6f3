// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for MikroTik Web UI application

use thiserror::Error;

use crate::mikrotik::ClientError;
use crate::registry::RegistryError;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Address parsing error
    #[error("Address parse error")]
    AddrParse(#[from] std::net::AddrParseError),

    /// Outbound HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Device registry misuse (duplicate address, unknown id, bad input)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Device REST API failure
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Metrics encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl AppError {
    /// Text safe to render in the UI. Never contains credentials.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Registry(e) => e.to_string(),
            Self::Client(e) => e.user_message(),
            Self::Config(_) | Self::Io(_) | Self::AddrParse(_) | Self::HttpClient(_) => {
                "Internal server error".to_string()
            }
            Self::Metrics(_) => "Metrics are temporarily unavailable".to_string(),
        }
    }

    /// True when the error means the requested device does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NotFound(_)))
    }
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;
