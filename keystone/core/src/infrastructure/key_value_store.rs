// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Key-Value Store
//!
//! [`Store`] implementation over any [`KeyValueClient`]. Each aggregate type
//! gets one table named after [`Persistable::table_name`] (plus the
//! configured prefix), keyed by its [`Persistable::domain_keys`].
//!
//! Domain key names must equal the encoded property names exactly; the
//! backend compares attribute names byte for byte.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::aggregate::Persistable;
use crate::domain::config::PersistenceConfig;
use crate::domain::store::{KeyValues, Store, StoreError};
use crate::domain::wire::{AttributeMap, WireValue};
use crate::infrastructure::key_value_client::KeyValueClient;
use crate::marshal::{scalar, Classification, Marshaller};

pub struct KeyValueStore<C> {
    client: C,
    marshaller: Marshaller,
    table_prefix: Option<String>,
}

impl<C: KeyValueClient> KeyValueStore<C> {
    pub fn new(client: C, marshaller: Marshaller) -> Self {
        Self {
            client,
            marshaller,
            table_prefix: None,
        }
    }

    pub fn from_config(client: C, config: &PersistenceConfig) -> Self {
        Self {
            client,
            marshaller: config.marshaller(),
            table_prefix: config.table_prefix.clone(),
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn marshaller(&self) -> &Marshaller {
        &self.marshaller
    }

    /// Backend table for `T`, including the prefix.
    pub fn table_for<T: Persistable>(&self) -> String {
        match &self.table_prefix {
            Some(prefix) => format!("{}{}", prefix, T::table_name()),
            None => T::table_name().to_string(),
        }
    }

    /// Creates the table for `T` if it does not exist yet.
    pub async fn register<T: Persistable>(&self) -> Result<(), StoreError> {
        let table = self.table_for::<T>();
        debug!(table = %table, keys = ?T::domain_keys(), "Registering table");
        self.client.create_table(&table, T::domain_keys()).await?;
        Ok(())
    }

    /// Removes the aggregate stored under `keys`. Returns whether it existed.
    pub async fn delete<T: Persistable>(&self, keys: KeyValues) -> Result<bool, StoreError> {
        let table = self.table_for::<T>();
        let key = self.key_attributes::<T>(&keys)?;
        debug!(table = %table, "Deleting item");
        Ok(self.client.delete(&table, &key).await?)
    }

    /// Pairs each domain key name with the caller's value, encoded as a
    /// scalar leaf.
    fn key_attributes<T: Persistable>(&self, keys: &KeyValues) -> Result<AttributeMap, StoreError> {
        let names = T::domain_keys();
        if names.len() != keys.len() {
            return Err(StoreError::InvalidKey(format!(
                "{} expects {} key value(s), got {}",
                T::table_name(),
                names.len(),
                keys.len()
            )));
        }

        let mut attributes = AttributeMap::new();
        for (name, (ty, value)) in names.iter().zip(keys.iter()) {
            let Classification::Scalar(kind) = self.marshaller.classify(ty) else {
                return Err(StoreError::InvalidKey(format!(
                    "key '{}' of {} must be a scalar, got {}",
                    name,
                    T::table_name(),
                    ty.name()
                )));
            };
            attributes.insert(name.to_string(), scalar::encode(kind, value)?);
        }
        Ok(attributes)
    }
}

#[async_trait]
impl<C: KeyValueClient> Store for KeyValueStore<C> {
    async fn load<T: Persistable>(&self, keys: KeyValues) -> Result<Option<T>, StoreError> {
        let table = self.table_for::<T>();
        let key = self.key_attributes::<T>(&keys)?;
        debug!(table = %table, "Getting item");

        match self.client.get(&table, &key).await? {
            Some(item) => Ok(Some(self.marshaller.from_wire(&WireValue::Map(item))?)),
            None => Ok(None),
        }
    }

    async fn save<T: Persistable>(&self, root: &T) -> Result<(), StoreError> {
        let table = self.table_for::<T>();
        let item = self
            .marshaller
            .to_wire(root)?
            .into_map()
            .ok_or_else(|| StoreError::NotAnObject(std::any::type_name::<T>().to_string()))?;
        debug!(table = %table, attributes = item.len(), "Putting item");
        self.client.put(&table, item).await?;
        Ok(())
    }
}
