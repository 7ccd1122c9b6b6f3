// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! ```rust
//! use mikrotik_webui::prelude::*;
//! ```

// Core types
pub use crate::config::{AppEnv, Config, DeviceConfig, MikrotikSettings};
pub use crate::error::{AppError, Result};

// Registry and service
pub use crate::registry::{Device, DeviceId, DeviceRegistry, DeviceStatus};
pub use crate::service::{DeviceForm, DeviceService};

// MikroTik client
pub use crate::mikrotik::{
    ClientError, Credentials, DeviceApi, DeviceEndpoint, DeviceTarget, MikroTikClient, Resource,
    RetryPolicy,
};

pub use crate::metrics::MetricsRegistry;
