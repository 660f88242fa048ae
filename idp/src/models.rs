// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::SERVICES_KEY_PREFIX;

/// A configured service provider paired with the location of its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSource {
    pub id: String,
    pub location: String,
}

impl ProviderSource {
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
        }
    }

    /// The store key this provider is registered under.
    pub fn key(&self) -> String {
        service_key(&self.id)
    }
}

pub fn service_key(id: &str) -> String {
    format!("{SERVICES_KEY_PREFIX}{id}")
}

/// The record written to the store for a registered service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// The configured service provider id.
    pub name: String,
    /// The metadata document as fetched, unmodified.
    pub metadata: String,
}

/// Lifecycle of one provider task during a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Pending,
    Attempting,
    Retrying,
    Succeeded,
    Failed,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Attempting => "attempting",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
