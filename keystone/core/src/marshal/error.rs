// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::any::type_name;

/// Errors raised while converting between domain values and wire values.
///
/// Every variant is fatal for the current call: no retries, and a failed
/// decode never hands back a partially built object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    #[error("Malformed scalar '{text}' for target {target}")]
    MalformedScalar { text: String, target: &'static str },

    #[error("Unknown member '{member}' for enum {enum_name}")]
    UnknownEnumMember {
        member: String,
        enum_name: &'static str,
    },

    #[error("No eligible constructor for type {type_name}")]
    NoEligibleConstructor { type_name: &'static str },

    #[error("Missing constructor argument '{parameter}' for type {type_name}")]
    MissingConstructorArgument {
        type_name: &'static str,
        parameter: &'static str,
    },

    #[error("Wire shape mismatch: expected {expected}, found {found}")]
    WireShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown field '{field}' for type {type_name}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    #[error("Duplicate key '{key}' (keys are matched case-insensitively)")]
    DuplicateKey { key: String },

    #[error("Descriptor does not match value: expected {expected}")]
    TypeMismatch { expected: &'static str },
}

impl MarshalError {
    pub(crate) fn type_mismatch<T>() -> Self {
        MarshalError::TypeMismatch {
            expected: type_name::<T>(),
        }
    }
}
