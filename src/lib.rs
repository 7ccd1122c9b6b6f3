// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # MikroTik Web UI
//!
//! Browser front end for MikroTik RouterOS devices.
//!
//! Operators register devices by address and credentials, then inspect live
//! system and interface data read over the RouterOS REST API.
//!
//! ## Main modules
//! - `api`: HTTP router, handlers and HTML fragments
//! - `config`: configuration management
//! - `error`: error types
//! - `metrics`: Prometheus registry for device calls
//! - `mikrotik`: RouterOS REST client
//! - `registry`: in-memory device catalog
//! - `service`: user actions on top of registry and client
//! - `prelude`: commonly used types and traits

mod api;
mod config;
mod error;
mod metrics;
mod mikrotik;
pub mod prelude;
mod registry;
mod service;

// Re-export commonly used types
/// Application configuration
pub use config::{AppEnv, Config, DeviceConfig, MikrotikSettings};

/// Application error and result type
pub use error::{AppError, Result};

/// HTTP API router, state and response types
pub use api::{AppState, create_router, handlers::HealthResponse};

/// Metrics registry, labels and outcome values
pub use metrics::{DeviceLabels, MetricsRegistry, OUTCOMES, RequestLabels, parse_uptime_to_seconds};

/// RouterOS REST client
pub use mikrotik::{
    ClientError, Credentials, DeviceApi, DeviceEndpoint, DeviceSession, DeviceSnapshot,
    DeviceTarget, InterfaceInfo, MikroTikClient, ProbeReport, Record, Resource, RetryPolicy,
    SystemResource, canonical_host, validate_host,
};

/// Device registry
pub use registry::{
    Device, DeviceId, DeviceMetadata, DeviceRegistry, DeviceStatus, NewDevice, Observation,
    RegistryError,
};

/// Application service layer
pub use service::{DeviceForm, DeviceService, DeviceView};
