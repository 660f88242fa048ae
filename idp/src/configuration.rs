// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::constants::{DEFAULT_BOOTSTRAP_TIMEOUT, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_ATTEMPTS};
use crate::errors::AppError;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct IdpOptions {
    /// Path to the IdP configuration file
    #[arg(short = 'c', long, env("IDP_CONFIG"))]
    pub config: PathBuf,
    /// Deadline for registering all service providers
    #[arg(long, default_value = "3m", env("IDP_BOOTSTRAP_TIMEOUT"), value_parser = humantime::parse_duration)]
    pub bootstrap_timeout: Duration,
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, env("IDP_MAX_ATTEMPTS"))]
    pub max_attempts: u32,
    /// Delay after each failed metadata attempt
    #[arg(long, env("IDP_BACKOFF"), value_parser = humantime::parse_duration)]
    pub backoff: Option<Duration>,
    #[arg(long, default_value = "30s", env("IDP_FETCH_TIMEOUT"), value_parser = humantime::parse_duration)]
    pub fetch_timeout: Duration,
    /// Accept self-signed certificates from metadata servers
    #[arg(long, default_value = "false", env("IDP_INSECURE_SKIP_VERIFY"), action = ArgAction::SetTrue)]
    pub insecure_skip_verify: bool,
}

impl Default for IdpOptions {
    fn default() -> Self {
        IdpOptions {
            config: PathBuf::from("idp.json"),
            bootstrap_timeout: DEFAULT_BOOTSTRAP_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            insecure_skip_verify: false,
        }
    }
}

/// Contents of the IdP configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IdpConfig {
    #[validate(length(min = 1, message = "private_key is required"))]
    pub private_key: String,
    #[validate(length(min = 1, message = "certificate is required"))]
    pub certificate: String,
    /// Base URL the IdP is served at, e.g. `https://idp.example:8443`
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    /// Service provider id to metadata URL.
    #[serde(default)]
    pub sp_metadata_urls: BTreeMap<String, String>,
}

impl IdpConfig {
    pub fn from_slice(contents: &[u8]) -> Result<Self, AppError> {
        let config: IdpConfig = serde_json::from_slice(contents)
            .map_err(|e| AppError::ConfigError(format!("invalid config: {e}")))?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("invalid config: {e}")))?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read(path).map_err(|e| {
            AppError::ConfigError(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::from_slice(&contents)
    }

    /// The `host:port` to listen on, derived from [`address`](Self::address).
    pub fn listen_address(&self) -> Result<String, AppError> {
        let url = Url::parse(&self.address)
            .map_err(|e| AppError::ConfigError(format!("cannot parse base URL: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::ConfigError("base URL has no host".to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| AppError::ConfigError("base URL has no port".to_string()))?;
        Ok(format!("{host}:{port}"))
    }
}
