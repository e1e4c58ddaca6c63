// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Marshaller
//!
//! Converts domain values to [`WireValue`] trees and back, driven by the
//! static layouts types publish through [`Describe`].
//!
//! # Architecture
//!
//! - **Layer:** Domain services
//! - **Pipeline:** classifier → scalar codec → sequence codec → object codec
//! - **State:** a [`DescriptorCache`] per marshaller, shareable via `Arc`
//!
//! Calls never touch I/O and never retain references to their inputs.

mod cache;
mod classifier;
mod descriptor;
mod error;
mod impls;
mod layout;
mod object;
pub mod scalar;
mod sequence;

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::wire::WireValue;

pub use cache::DescriptorCache;
pub use classifier::{Classification, ElementFamily};
pub use descriptor::{
    AnyBox, Describe, EnumDescriptor, ScalarKind, SequenceLayout, Shape, TypeDescriptor, TypeRef,
    WireEnum,
};
pub use error::MarshalError;
pub use layout::{
    param, Arguments, Constructor, ObjectLayout, ObjectLayoutBuilder, Parameter, Property,
    PropertyAccess,
};

/// How decoding treats wire content the target type does not account for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Drop unmatched keys; absent sequence arguments become empty.
    #[default]
    Lenient,
    /// Reject unmatched keys and absent sequence arguments.
    Strict,
}

impl fmt::Display for DecodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodePolicy::Lenient => write!(f, "lenient"),
            DecodePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(DecodePolicy::Lenient),
            "strict" => Ok(DecodePolicy::Strict),
            other => Err(format!("Unknown decode policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Marshaller {
    cache: Arc<DescriptorCache>,
    policy: DecodePolicy,
}

impl Marshaller {
    /// Lenient marshaller with a fresh cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DecodePolicy) -> Self {
        Self {
            cache: Arc::default(),
            policy,
        }
    }

    /// Marshaller sharing an existing descriptor cache.
    pub fn with_cache(cache: Arc<DescriptorCache>, policy: DecodePolicy) -> Self {
        Self { cache, policy }
    }

    #[inline]
    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    pub fn classify(&self, ty: TypeRef) -> Classification {
        self.cache.classify(ty)
    }

    /// Encodes any describable value. Scalars and sequences are valid at
    /// the top level, not just complex objects.
    pub fn to_wire<T: Describe>(&self, value: &T) -> Result<WireValue, MarshalError> {
        self.encode_value(TypeRef::of::<T>(), value)
    }

    pub fn from_wire<T: Describe>(&self, wire: &WireValue) -> Result<T, MarshalError> {
        self.decode_value(TypeRef::of::<T>(), wire)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MarshalError::type_mismatch::<T>())
    }

    pub(crate) fn encode_value(
        &self,
        ty: TypeRef,
        value: &dyn Any,
    ) -> Result<WireValue, MarshalError> {
        match self.cache.classify(ty) {
            Classification::Scalar(kind) => scalar::encode(kind, value),
            Classification::Sequence { family, .. } => {
                let descriptor = self.cache.descriptor(ty);
                let layout = sequence_layout(&descriptor)?;
                sequence::encode(self, layout, family, value)
            }
            Classification::Complex => {
                let descriptor = self.cache.descriptor(ty);
                let layout = object_layout(&descriptor)?;
                object::encode(self, layout, value)
            }
        }
    }

    pub(crate) fn decode_value(
        &self,
        ty: TypeRef,
        wire: &WireValue,
    ) -> Result<AnyBox, MarshalError> {
        match self.cache.classify(ty) {
            Classification::Scalar(kind) => scalar::decode(kind, wire),
            Classification::Sequence { family, .. } => {
                let descriptor = self.cache.descriptor(ty);
                let layout = sequence_layout(&descriptor)?;
                sequence::decode(self, layout, family, wire)
            }
            Classification::Complex => {
                let descriptor = self.cache.descriptor(ty);
                let layout = object_layout(&descriptor)?;
                object::decode(self, layout, wire)
            }
        }
    }
}

fn sequence_layout(descriptor: &TypeDescriptor) -> Result<&SequenceLayout, MarshalError> {
    descriptor.as_sequence().ok_or(MarshalError::TypeMismatch {
        expected: descriptor.name(),
    })
}

fn object_layout(descriptor: &TypeDescriptor) -> Result<&ObjectLayout, MarshalError> {
    descriptor.as_complex().ok_or(MarshalError::TypeMismatch {
        expected: descriptor.name(),
    })
}
