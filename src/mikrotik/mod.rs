//! `MikroTik` `RouterOS` REST API client module
//!
//! This module talks to routers over their `/rest` HTTP API: authenticated
//! GET requests, normalization of replies into string records, typed
//! failures and bounded retry of transient errors.

mod client;
mod error;
mod parse;
mod retry;
mod session;
mod types;

// Re-export public types and functions
pub use client::{DeviceApi, MikroTikClient};
pub use error::ClientError;
pub use retry::RetryPolicy;
pub use session::DeviceSession;
pub use types::{
    Credentials, DeviceEndpoint, DeviceSnapshot, DeviceTarget, InterfaceInfo, ProbeReport, Record,
    Resource, SystemResource, canonical_host, validate_host,
};
