// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Descriptor Cache
//!
//! Memoizes descriptors and classifications per exact `TypeId`. Entries are
//! inserted once and never invalidated; types cannot change shape while the
//! process runs.
//!
//! The cache is an explicit object owned by a [`Marshaller`] (usually through
//! an `Arc`), so tests can start from an empty cache and unrelated
//! marshallers do not share state unless asked to.
//!
//! [`Marshaller`]: crate::marshal::Marshaller

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::marshal::classifier::{self, Classification};
use crate::marshal::descriptor::{Describe, TypeDescriptor, TypeRef};

#[derive(Debug, Default)]
pub struct DescriptorCache {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
    classifications: DashMap<TypeId, Classification>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(&self, ty: TypeRef) -> Arc<TypeDescriptor> {
        if let Some(found) = self.descriptors.get(&ty.id()) {
            return Arc::clone(found.value());
        }

        trace!(type_name = ty.name(), "Describing type on cache miss");
        // Built outside any shard lock; a racing thread may win the insert.
        let described = Arc::new(ty.describe());
        let entry = self.descriptors.entry(ty.id()).or_insert(described);
        Arc::clone(entry.value())
    }

    pub fn classify(&self, ty: TypeRef) -> Classification {
        if let Some(found) = self.classifications.get(&ty.id()) {
            return *found.value();
        }

        let descriptor = self.descriptor(ty);
        let classification = classifier::classify(&descriptor, self);
        *self
            .classifications
            .entry(ty.id())
            .or_insert(classification)
            .value()
    }

    pub fn contains<T: Describe>(&self) -> bool {
        self.descriptors.contains_key(&TypeId::of::<T>())
    }

    /// Number of described types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
