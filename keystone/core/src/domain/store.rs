// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Store Interface
//!
//! Persistence contract for aggregates, implemented in
//! `crate::infrastructure`. A store marshals the aggregate to a wire map,
//! hands it to its backend and reverses the trip on load.
//!
//! | Implementation | Backend |
//! |----------------|---------|
//! | `KeyValueStore` | any [`KeyValueClient`](crate::infrastructure::KeyValueClient) |

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::domain::aggregate::Persistable;
use crate::marshal::{AnyBox, Describe, MarshalError, TypeRef};

#[async_trait]
pub trait Store: Send + Sync {
    /// Loads the aggregate whose domain keys equal `keys`, in declaration
    /// order.
    async fn load<T: Persistable>(&self, keys: KeyValues) -> Result<Option<T>, StoreError>;

    /// Creates or replaces the aggregate.
    async fn save<T: Persistable>(&self, root: &T) -> Result<(), StoreError>;
}

/// Ordered key values supplied by a caller, one per domain key.
#[derive(Default)]
pub struct KeyValues {
    values: Vec<(TypeRef, AnyBox)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field key.
    pub fn of<V: Describe>(value: V) -> Self {
        Self::new().with(value)
    }

    pub fn with<V: Describe>(mut self, value: V) -> Self {
        self.values.push((TypeRef::of::<V>(), Box::new(value)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &dyn Any)> {
        self.values
            .iter()
            .map(|(ty, value)| (*ty, value.as_ref() as &dyn Any))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for KeyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|(ty, _)| ty.name()))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Marshalling error: {0}")]
    Marshal(#[from] MarshalError),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Type {0} does not marshal to a map and cannot be stored")]
    NotAnObject(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_keep_order_and_types() {
        let keys = KeyValues::of("tenant-a".to_string()).with(42i64);
        assert_eq!(keys.len(), 2);

        let collected: Vec<_> = keys.iter().collect();
        assert!(collected[0].0.is::<String>());
        assert_eq!(collected[0].1.downcast_ref::<String>().unwrap(), "tenant-a");
        assert_eq!(collected[1].1.downcast_ref::<i64>(), Some(&42));
        assert_eq!(format!("{keys:?}"), r#"["alloc::string::String", "i64"]"#);
    }

    #[test]
    fn test_store_error_wraps_marshal_errors() {
        let err: StoreError = MarshalError::NoEligibleConstructor { type_name: "Foo" }.into();
        assert_eq!(
            err.to_string(),
            "Marshalling error: No eligible constructor for type Foo"
        );
    }
}
