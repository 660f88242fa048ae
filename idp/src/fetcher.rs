// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Retrieval of service provider metadata over HTTP.
//!
//! A fetch is exactly one GET with no retry of its own; retrying is layered on
//! top by [`crate::retry`].

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::constants::{MAX_METADATA_SIZE, USER_AGENT};
use crate::errors::FetchError;

pub trait MetadataFetcher: Send + Sync {
    /// Performs a single GET of `location` and returns the response body.
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// [`MetadataFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_size: u64,
}

impl HttpFetcher {
    /// Builds a fetcher with the given per-request timeout.
    ///
    /// When `accept_invalid_certs` is set, self-signed and otherwise
    /// untrusted server certificates are accepted. Only meant for test
    /// deployments.
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self, reqwest::Error> {
        if accept_invalid_certs {
            tracing::warn!("[idp] accepting invalid certificates for metadata requests");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            max_size: MAX_METADATA_SIZE,
        })
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_size: MAX_METADATA_SIZE,
        }
    }
}

impl MetadataFetcher for HttpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(location).map_err(|source| FetchError::InvalidUrl {
            location: location.to_string(),
            source,
        })?;

        let mut response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    location: location.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        // Fail fast on an advertised length; chunked bodies are counted as
        // they are read.
        if response
            .content_length()
            .is_some_and(|length| length > self.max_size)
        {
            return Err(FetchError::TooLarge {
                location: location.to_string(),
                limit: self.max_size,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Body {
            location: location.to_string(),
            source,
        })? {
            if (body.len() + chunk.len()) as u64 > self.max_size {
                return Err(FetchError::TooLarge {
                    location: location.to_string(),
                    limit: self.max_size,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::trace!("[idp] fetched {} bytes from {}", body.len(), location);

        Ok(body)
    }
}
