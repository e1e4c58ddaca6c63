// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Sequence Codec
//!
//! One wire variant per element family:
//!
//! - text-like scalars (including bools and enum members) → `SS`
//! - numeric scalars → `NS`
//! - bytes (`Vec<u8>`) → a single `B` blob
//! - byte sequences (`Vec<Vec<u8>>`) → `BS`
//! - complex objects and nested sequences → `L`, one entry per element
//!
//! Decoding a sequence from any other variant is a
//! [`MarshalError::WireShapeMismatch`]; there is no silent fallback to an
//! empty collection.

use std::any::Any;

use bytes::Bytes;

use crate::domain::wire::WireValue;
use crate::marshal::classifier::ElementFamily;
use crate::marshal::descriptor::{AnyBox, ScalarKind, SequenceLayout};
use crate::marshal::error::MarshalError;
use crate::marshal::{scalar, Marshaller};

pub(crate) fn encode(
    marshaller: &Marshaller,
    layout: &SequenceLayout,
    family: ElementFamily,
    value: &dyn Any,
) -> Result<WireValue, MarshalError> {
    match family {
        ElementFamily::Scalar(ScalarKind::Byte) => blob(value).map(WireValue::Bytes),
        ElementFamily::Scalar(kind) => {
            let rendered = layout
                .items(value)?
                .into_iter()
                .map(|item| scalar::render(kind, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if kind.is_numeric() {
                WireValue::NumSet(rendered)
            } else {
                WireValue::StrSet(rendered)
            })
        }
        ElementFamily::Blob => layout
            .items(value)?
            .into_iter()
            .map(blob)
            .collect::<Result<Vec<_>, _>>()
            .map(WireValue::BytesSet),
        ElementFamily::Composite => layout
            .items(value)?
            .into_iter()
            .map(|item| marshaller.encode_value(layout.element(), item))
            .collect::<Result<Vec<_>, _>>()
            .map(WireValue::List),
    }
}

pub(crate) fn decode(
    marshaller: &Marshaller,
    layout: &SequenceLayout,
    family: ElementFamily,
    wire: &WireValue,
) -> Result<AnyBox, MarshalError> {
    let items = match (family, wire) {
        (ElementFamily::Scalar(ScalarKind::Byte), WireValue::Bytes(bytes)) => {
            return Ok(Box::new(bytes.to_vec()));
        }
        (ElementFamily::Scalar(kind), WireValue::NumSet(entries)) if kind.is_numeric() => entries
            .iter()
            .map(|entry| scalar::parse(kind, entry))
            .collect::<Result<Vec<_>, _>>()?,
        (ElementFamily::Scalar(kind), WireValue::StrSet(entries)) if !kind.is_numeric() => entries
            .iter()
            .map(|entry| scalar::parse(kind, entry))
            .collect::<Result<Vec<_>, _>>()?,
        (ElementFamily::Blob, WireValue::BytesSet(blobs)) => blobs
            .iter()
            .map(|bytes| Box::new(bytes.to_vec()) as AnyBox)
            .collect(),
        (ElementFamily::Composite, WireValue::List(entries)) => entries
            .iter()
            .map(|entry| marshaller.decode_value(layout.element(), entry))
            .collect::<Result<Vec<_>, _>>()?,
        (family, other) => {
            return Err(MarshalError::WireShapeMismatch {
                expected: wire_variant(family),
                found: other.variant_name(),
            })
        }
    };
    layout.collect(items)
}

/// Collection with no elements, used for absent sequence arguments.
pub(crate) fn empty(layout: &SequenceLayout) -> Result<AnyBox, MarshalError> {
    layout.collect(Vec::new())
}

/// Wire tag a sequence of `family` encodes to.
pub fn wire_variant(family: ElementFamily) -> &'static str {
    match family {
        ElementFamily::Scalar(ScalarKind::Byte) => "B",
        ElementFamily::Scalar(kind) if kind.is_numeric() => "NS",
        ElementFamily::Scalar(_) => "SS",
        ElementFamily::Blob => "BS",
        ElementFamily::Composite => "L",
    }
}

fn blob(value: &dyn Any) -> Result<Bytes, MarshalError> {
    value
        .downcast_ref::<Vec<u8>>()
        .map(|bytes| Bytes::copy_from_slice(bytes))
        .ok_or_else(MarshalError::type_mismatch::<Vec<u8>>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::descriptor::{Describe, TypeRef};
    use crate::marshal::classifier::Classification;

    fn round_trip<T: Describe + PartialEq + std::fmt::Debug>(value: T) -> WireValue {
        let marshaller = Marshaller::new();
        let wire = marshaller.to_wire(&value).unwrap();
        assert_eq!(marshaller.from_wire::<T>(&wire).unwrap(), value);
        wire
    }

    #[test]
    fn test_scalar_sets() {
        assert_eq!(
            round_trip(vec!["a".to_string(), "b".to_string()]),
            WireValue::StrSet(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            round_trip(vec![3i32, 1, 2]),
            WireValue::NumSet(vec!["3".to_string(), "1".to_string(), "2".to_string()])
        );
        assert_eq!(
            round_trip(vec![true, false]),
            WireValue::StrSet(vec!["true".to_string(), "false".to_string()])
        );
    }

    #[test]
    fn test_bytes_are_a_single_blob() {
        assert_eq!(
            round_trip(vec![0u8, 1, 255]),
            WireValue::Bytes(Bytes::from_static(&[0, 1, 255]))
        );
    }

    #[test]
    fn test_byte_sequences_form_a_blob_set() {
        assert_eq!(
            round_trip(vec![vec![1u8, 2], vec![], vec![3u8]]),
            WireValue::BytesSet(vec![
                Bytes::from_static(&[1, 2]),
                Bytes::new(),
                Bytes::from_static(&[3]),
            ])
        );
    }

    #[test]
    fn test_nested_sequences_use_lists() {
        assert_eq!(
            round_trip(vec![vec![1i64], vec![2, 3]]),
            WireValue::List(vec![
                WireValue::NumSet(vec!["1".to_string()]),
                WireValue::NumSet(vec!["2".to_string(), "3".to_string()]),
            ])
        );
    }

    #[test]
    fn test_empty_sequence_is_an_empty_variant() {
        assert_eq!(round_trip(Vec::<String>::new()), WireValue::StrSet(Vec::new()));
        assert_eq!(round_trip(Vec::<u8>::new()), WireValue::Bytes(Bytes::new()));
    }

    #[test]
    fn test_mismatched_variant_fails_loudly() {
        let marshaller = Marshaller::new();
        let err = marshaller
            .from_wire::<Vec<i32>>(&WireValue::StrSet(vec!["1".to_string()]))
            .unwrap_err();
        assert_eq!(
            err,
            MarshalError::WireShapeMismatch {
                expected: "NS",
                found: "SS",
            }
        );
    }

    #[test]
    fn test_malformed_element_fails() {
        let marshaller = Marshaller::new();
        let err = marshaller
            .from_wire::<Vec<u16>>(&WireValue::NumSet(vec!["1".to_string(), "-1".to_string()]))
            .unwrap_err();
        assert!(matches!(err, MarshalError::MalformedScalar { target: "uint16", .. }));
    }

    #[test]
    fn test_empty_collects_target_shape() {
        let marshaller = Marshaller::new();
        let ty = TypeRef::of::<Vec<String>>();
        assert!(matches!(marshaller.classify(ty), Classification::Sequence { .. }));
        let descriptor = marshaller.cache().descriptor(ty);
        let empty = empty(descriptor.as_sequence().unwrap()).unwrap();
        assert_eq!(*empty.downcast::<Vec<String>>().unwrap(), Vec::<String>::new());
    }
}
