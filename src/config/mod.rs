// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for MikroTik Web UI application
//!
//! Loads and parses configuration from environment variables and JSON.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};


/// Default configuration values
pub mod defaults {
    pub const SERVER_ADDR: &str = "0.0.0.0:8000";
    pub const MIKROTIK_PORT: u16 = 80;
    pub const MIKROTIK_USERNAME: &str = "admin";
    pub const MIKROTIK_PASSWORD: &str = "";
    pub const MIKROTIK_TIMEOUT_SECS: u64 = 10;
    pub const MIKROTIK_MAX_RETRIES: u32 = 2;
    pub const MIKROTIK_RETRY_BASE_MS: u64 = 200;
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
    pub const APP_ENV: &str = "APP_ENV";
    pub const MIKROTIK_DEFAULT_PORT: &str = "MIKROTIK_DEFAULT_PORT";
    pub const MIKROTIK_USERNAME: &str = "MIKROTIK_USERNAME";
    pub const MIKROTIK_PASSWORD: &str = "MIKROTIK_PASSWORD";
    pub const MIKROTIK_TIMEOUT: &str = "MIKROTIK_TIMEOUT";
    pub const MIKROTIK_USE_TLS: &str = "MIKROTIK_USE_TLS";
    pub const MIKROTIK_MAX_RETRIES: &str = "MIKROTIK_MAX_RETRIES";
    pub const MIKROTIK_RETRY_BASE_MS: &str = "MIKROTIK_RETRY_BASE_MS";
    pub const DEVICES_CONFIG: &str = "DEVICES_CONFIG";
}

/// Deployment mode selected by `APP_ENV`
///
/// Only affects default log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("Unknown APP_ENV '{other}'")),
        }
    }
}

impl AppEnv {
    /// Reads `APP_ENV`, falling back to development
    pub fn from_env() -> Self {
        std::env::var(env_vars::APP_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Log filter used when `RUST_LOG` is not set
    #[must_use]
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => "info,mikrotik_webui=debug",
            Self::Production => "info",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// A device to register at startup (entry of `DEVICES_CONFIG`)
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub address: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl DeviceConfig {
    /// Validates device configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("Device address cannot be empty".to_string());
        }

        if self.port == Some(0) {
            return Err(format!("Invalid port 0 for device '{}'", self.address));
        }

        if let Some(username) = &self.username {
            if username.trim().is_empty() {
                return Err(format!(
                    "Username cannot be empty for device '{}'",
                    self.address
                ));
            }
        }

        Ok(())
    }
}

/// Settings of the outbound RouterOS REST client
#[derive(Debug, Clone)]
pub struct MikrotikSettings {
    pub default_port: u16,
    pub username: String,
    pub password: SecretString,
    pub timeout: Duration,
    pub use_tls: bool,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for MikrotikSettings {
    fn default() -> Self {
        Self {
            default_port: defaults::MIKROTIK_PORT,
            username: defaults::MIKROTIK_USERNAME.to_string(),
            password: SecretString::from(defaults::MIKROTIK_PASSWORD.to_string()),
            timeout: Duration::from_secs(defaults::MIKROTIK_TIMEOUT_SECS),
            use_tls: false,
            max_retries: defaults::MIKROTIK_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(defaults::MIKROTIK_RETRY_BASE_MS),
        }
    }
}

/// Application-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub app_env: AppEnv,
    pub mikrotik: MikrotikSettings,
    pub devices: Vec<DeviceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: defaults::SERVER_ADDR.to_string(),
            app_env: AppEnv::default(),
            mikrotik: MikrotikSettings::default(),
            devices: vec![],
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr =
            lookup(env_vars::SERVER_ADDR).unwrap_or_else(|| defaults::SERVER_ADDR.to_string());

        let app_env = match lookup(env_vars::APP_ENV) {
            Some(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!("{}. Using development.", e);
                AppEnv::Development
            }),
            None => AppEnv::default(),
        };

        let mikrotik = MikrotikSettings {
            default_port: parse_or(
                &lookup,
                env_vars::MIKROTIK_DEFAULT_PORT,
                defaults::MIKROTIK_PORT,
            ),
            username: lookup(env_vars::MIKROTIK_USERNAME)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| defaults::MIKROTIK_USERNAME.to_string()),
            password: SecretString::from(
                lookup(env_vars::MIKROTIK_PASSWORD)
                    .unwrap_or_else(|| defaults::MIKROTIK_PASSWORD.to_string()),
            ),
            timeout: Duration::from_secs(parse_positive_or(
                &lookup,
                env_vars::MIKROTIK_TIMEOUT,
                defaults::MIKROTIK_TIMEOUT_SECS,
            )),
            use_tls: lookup(env_vars::MIKROTIK_USE_TLS)
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on")),
            max_retries: parse_or(
                &lookup,
                env_vars::MIKROTIK_MAX_RETRIES,
                defaults::MIKROTIK_MAX_RETRIES,
            ),
            retry_base_delay: Duration::from_millis(parse_or(
                &lookup,
                env_vars::MIKROTIK_RETRY_BASE_MS,
                defaults::MIKROTIK_RETRY_BASE_MS,
            )),
        };

        let devices: Vec<DeviceConfig> = match lookup(env_vars::DEVICES_CONFIG) {
            Some(config_json) => serde_json::from_str(&config_json).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse DEVICES_CONFIG: {}. Using empty list.", e);
                vec![]
            }),
            None => vec![],
        };

        // Drop invalid device entries up front
        let devices = devices
            .into_iter()
            .filter(|device| match device.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Invalid device configuration: {}", e);
                    tracing::warn!("Skipping invalid device: {}", device.address);
                    false
                }
            })
            .collect();

        Config {
            server_addr,
            app_env,
            mikrotik,
            devices,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value '{}' for {}. Using default.", raw, key);
            default
        }),
        None => default,
    }
}

/// Like [`parse_or`], but zero is rejected as well
fn parse_positive_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default) {
        0 => {
            tracing::warn!("Invalid value '0' for {}. Using default.", key);
            default
        }
        value => value,
    }
}
