// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

/// Store keys for registered service providers are `SERVICES_KEY_PREFIX + id`.
pub const SERVICES_KEY_PREFIX: &str = "/services/";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(180); // 3 minutes
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_METADATA_SIZE: u64 = 10 * 1024 * 1024; // 10 MB
pub const METADATA_CONTENT_TYPE: &str = "application/samlmetadata+xml";
pub const USER_AGENT: &str = concat!("idp-bootstrap/", env!("CARGO_PKG_VERSION"));
