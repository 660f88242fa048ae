// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Key-value storage for registered service providers.
//!
//! The bootstrap only ever writes through [`Store::put`]. Implementations must
//! accept concurrent writes for distinct keys; [`MemoryStore`] does so behind
//! a [`RwLock`].

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::constants::SERVICES_KEY_PREFIX;
use crate::errors::StoreError;
use crate::models::{Service, service_key};

pub trait Store: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Value, StoreError>> + Send;
}

/// In-process store shared by the bootstrap and the HTTP API.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all keys beginning with `prefix`, in sorted order.
    pub async fn keys(&self, prefix: &str) -> Vec<String> {
        let values = self.values.read().await;
        values
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

impl Store for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Value, StoreError> {
        let values = self.values.read().await;
        values
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

/// Looks up registered service providers by id.
pub struct ServiceProviders<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> ServiceProviders<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Service, StoreError> {
        let key = service_key(id);
        let value = self.store.get(&key).await.inspect_err(|e| {
            tracing::error!("[idp] {}", e);
        })?;
        serde_json::from_value(value).map_err(|e| StoreError::Serialization {
            key,
            message: e.to_string(),
        })
    }
}

impl ServiceProviders<'_, MemoryStore> {
    /// Ids of every registered service provider, sorted.
    pub async fn ids(&self) -> Vec<String> {
        self.store
            .keys(SERVICES_KEY_PREFIX)
            .await
            .into_iter()
            .filter_map(|key| key.strip_prefix(SERVICES_KEY_PREFIX).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        let result = store.get("/services/missing").await;
        assert_eq!(
            result,
            Err(StoreError::NotFound("/services/missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("/services/a", json!("one")).await.unwrap();
        store.put("/services/a", json!("two")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("/services/a").await.unwrap(), json!("two"));
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let store = MemoryStore::new();
        store.put("/services/b", json!(1)).await.unwrap();
        store.put("/users/alice", json!(2)).await.unwrap();
        store.put("/services/a", json!(3)).await.unwrap();
        assert_eq!(
            store.keys(SERVICES_KEY_PREFIX).await,
            vec!["/services/a".to_string(), "/services/b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_concurrent_puts_for_distinct_keys() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(&format!("/services/sp{i}"), json!(i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.len().await, 32);
    }

    #[tokio::test]
    async fn test_service_providers_lookup() {
        let store = MemoryStore::new();
        let service = Service {
            name: "sp".to_string(),
            metadata: "<EntityDescriptor/>".to_string(),
        };
        store
            .put("/services/sp", serde_json::to_value(&service).unwrap())
            .await
            .unwrap();
        store.put("/users/bob", json!({})).await.unwrap();

        let providers = ServiceProviders::new(&store);
        assert_eq!(providers.get("sp").await.unwrap(), service);
        assert_eq!(providers.ids().await, vec!["sp".to_string()]);
        assert!(matches!(
            providers.get("other").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_service_providers_rejects_foreign_shape() {
        let store = MemoryStore::new();
        store.put("/services/sp", json!("raw")).await.unwrap();
        let providers = ServiceProviders::new(&store);
        assert!(matches!(
            providers.get("sp").await,
            Err(StoreError::Serialization { .. })
        ));
    }
}
