// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Registration of fetched metadata into the [`Store`].

use std::sync::Arc;

use crate::errors::{AttemptError, RegisterError, StoreError};
use crate::fetcher::MetadataFetcher;
use crate::models::{ProviderSource, Service, service_key};
use crate::retry::Attempt;
use crate::store::Store;

/// Fetches a provider's metadata and writes it to the store.
///
/// Used as the innermost [`Attempt`] of a bootstrap run.
pub struct Registrar<F, S> {
    fetcher: F,
    store: Arc<S>,
}

impl<F: MetadataFetcher, S: Store> Registrar<F, S> {
    pub fn new(fetcher: F, store: Arc<S>) -> Self {
        Self { fetcher, store }
    }

    /// Validates `document` and stores it under `/services/<id>`.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::NotWellFormed`] if the document is not UTF-8 XML
    /// - [`RegisterError::Store`] if the write fails
    #[tracing::instrument(skip(self, document), fields(bytes = document.len()))]
    pub async fn register(&self, id: &str, document: &[u8]) -> Result<(), RegisterError> {
        let metadata = well_formed(id, document)?;

        let key = service_key(id);
        let service = Service {
            name: id.to_string(),
            metadata: metadata.to_string(),
        };
        let value = serde_json::to_value(&service).map_err(|e| RegisterError::Store {
            id: id.to_string(),
            source: StoreError::Serialization {
                key: key.clone(),
                message: e.to_string(),
            },
        })?;

        self.store
            .put(&key, value)
            .await
            .map_err(|source| RegisterError::Store {
                id: id.to_string(),
                source,
            })?;

        tracing::info!("[idp] registered service provider {} at {}", id, key);

        Ok(())
    }
}

impl<F: MetadataFetcher, S: Store> Attempt for Registrar<F, S> {
    async fn attempt(&self, source: &ProviderSource) -> Result<(), AttemptError> {
        let document = self.fetcher.fetch(&source.location).await?;
        self.register(&source.id, &document).await?;
        Ok(())
    }
}

/// Returns the document text if it parses as XML.
fn well_formed<'a>(id: &str, document: &'a [u8]) -> Result<&'a str, RegisterError> {
    let text = std::str::from_utf8(document).map_err(|e| RegisterError::NotWellFormed {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    roxmltree::Document::parse(text).map_err(|e| RegisterError::NotWellFormed {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    Ok(text)
}
