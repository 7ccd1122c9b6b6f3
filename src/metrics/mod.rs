// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metrics registry and update module for MikroTik Web UI
//!
//! Contains types for labels, parsers, and Prometheus metrics registry.

mod labels;
mod parsers;
mod registry;


/// Labels for devices and device calls
pub use labels::{DeviceLabels, RequestLabels};

/// RouterOS uptime parser
pub use parsers::parse_uptime_to_seconds;

/// Prometheus metrics registry
pub use registry::{MetricsRegistry, OUTCOMES};
