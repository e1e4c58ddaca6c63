// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Key-Value Client
//!
//! The narrow slice of a document/key-value backend the store needs: tables
//! with named key attributes, whole-item put, get and delete by key.
//!
//! [`InMemoryKeyValueClient`] is used for development and tests. Network
//! clients implement [`KeyValueClient`] in their own crates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::store::StoreError;
use crate::domain::wire::{AttributeMap, WireValue};

#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Creates `table` keyed by `key_names`. Creating an existing table is a
    /// no-op.
    async fn create_table(&self, table: &str, key_names: &[&str]) -> Result<(), ClientError>;

    /// Inserts or replaces the item with the same key attributes.
    async fn put(&self, table: &str, item: AttributeMap) -> Result<(), ClientError>;

    async fn get(&self, table: &str, key: &AttributeMap)
        -> Result<Option<AttributeMap>, ClientError>;

    /// Returns whether an item was removed.
    async fn delete(&self, table: &str, key: &AttributeMap) -> Result<bool, ClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Item for table {table} is missing key attribute '{attribute}'")]
    MissingKeyAttribute { table: String, attribute: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Debug, Default)]
struct Table {
    key_names: Vec<String>,
    items: HashMap<String, AttributeMap>,
}

impl Table {
    /// Canonical text of the key attributes, in key order.
    fn item_key(&self, table: &str, attributes: &AttributeMap) -> Result<String, ClientError> {
        let parts = self
            .key_names
            .iter()
            .map(|name| {
                attributes
                    .get(name)
                    .ok_or_else(|| ClientError::MissingKeyAttribute {
                        table: table.to_string(),
                        attribute: name.clone(),
                    })
            })
            .collect::<Result<Vec<&WireValue>, _>>()?;
        serde_json::to_string(&parts).map_err(|e| ClientError::Serialization(e.to_string()))
    }
}

/// In-memory key-value backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueClient {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryKeyValueClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn item_count(&self, table: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.items.len())
    }
}

#[async_trait]
impl KeyValueClient for InMemoryKeyValueClient {
    async fn create_table(&self, table: &str, key_names: &[&str]) -> Result<(), ClientError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_insert_with(|| Table {
            key_names: key_names.iter().map(|name| name.to_string()).collect(),
            items: HashMap::new(),
        });
        Ok(())
    }

    async fn put(&self, table: &str, item: AttributeMap) -> Result<(), ClientError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| ClientError::TableNotFound(table.to_string()))?;
        let key = entry.item_key(table, &item)?;
        entry.items.insert(key, item);
        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        key: &AttributeMap,
    ) -> Result<Option<AttributeMap>, ClientError> {
        let tables = self.tables.read().await;
        let entry = tables
            .get(table)
            .ok_or_else(|| ClientError::TableNotFound(table.to_string()))?;
        let key = entry.item_key(table, key)?;
        Ok(entry.items.get(&key).cloned())
    }

    async fn delete(&self, table: &str, key: &AttributeMap) -> Result<bool, ClientError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| ClientError::TableNotFound(table.to_string()))?;
        let key = entry.item_key(table, key)?;
        Ok(entry.items.remove(&key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str) -> AttributeMap {
        AttributeMap::from([
            ("Id".to_string(), WireValue::Str(id.to_string())),
            ("Name".to_string(), WireValue::Str(name.to_string())),
        ])
    }

    fn key(id: &str) -> AttributeMap {
        AttributeMap::from([("Id".to_string(), WireValue::Str(id.to_string()))])
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let client = InMemoryKeyValueClient::new();
        client.create_table("people", &["Id"]).await.unwrap();

        client.put("people", item("1", "Ada")).await.unwrap();
        client.put("people", item("1", "Ada L.")).await.unwrap();
        assert_eq!(client.item_count("people").await, Some(1));

        let found = client.get("people", &key("1")).await.unwrap().unwrap();
        assert_eq!(found["Name"], WireValue::Str("Ada L.".to_string()));
        assert!(client.get("people", &key("2")).await.unwrap().is_none());

        assert!(client.delete("people", &key("1")).await.unwrap());
        assert!(!client.delete("people", &key("1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_table_and_key_attribute() {
        let client = InMemoryKeyValueClient::new();
        let err = client.put("ghosts", item("1", "Boo")).await.unwrap_err();
        assert!(matches!(err, ClientError::TableNotFound(ref t) if t == "ghosts"));

        client.create_table("people", &["Id", "Region"]).await.unwrap();
        let err = client.put("people", item("1", "Ada")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::MissingKeyAttribute { ref attribute, .. } if attribute == "Region"
        ));
    }

    #[tokio::test]
    async fn test_create_table_is_idempotent() {
        let client = InMemoryKeyValueClient::new();
        client.create_table("people", &["Id"]).await.unwrap();
        client.put("people", item("1", "Ada")).await.unwrap();
        client.create_table("people", &["Id"]).await.unwrap();
        assert_eq!(client.item_count("people").await, Some(1));
    }
}
