// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Type Classifier
//!
//! Maps a descriptor onto one of three categories: scalar, sequence, complex.
//! Sequences also carry the family their elements encode as, which decides
//! the wire variant (`SS`/`NS`, `B`, `BS` or `L`).
//!
//! Classification is total: anything that is neither scalar nor sequence is
//! complex and encodes as a (possibly empty) map.

use crate::marshal::cache::DescriptorCache;
use crate::marshal::descriptor::{ScalarKind, Shape, TypeDescriptor, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Scalar(ScalarKind),
    Sequence {
        element: TypeRef,
        family: ElementFamily,
    },
    Complex,
}

/// How the elements of a sequence travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFamily {
    /// Scalar elements: one homogeneous set, or a single blob for bytes.
    Scalar(ScalarKind),
    /// Elements that are themselves byte sequences.
    Blob,
    /// Complex objects or nested non-byte sequences, carried in a list.
    Composite,
}

pub fn classify(descriptor: &TypeDescriptor, cache: &DescriptorCache) -> Classification {
    match descriptor.shape() {
        Shape::Scalar(kind) => Classification::Scalar(*kind),
        Shape::Sequence(layout) => Classification::Sequence {
            element: layout.element(),
            family: element_family(layout.element(), cache),
        },
        Shape::Complex(_) => Classification::Complex,
    }
}

fn element_family(element: TypeRef, cache: &DescriptorCache) -> ElementFamily {
    let descriptor = cache.descriptor(element);
    match descriptor.shape() {
        Shape::Scalar(kind) => ElementFamily::Scalar(*kind),
        Shape::Sequence(inner) if is_byte(inner.element(), cache) => ElementFamily::Blob,
        _ => ElementFamily::Composite,
    }
}

fn is_byte(ty: TypeRef, cache: &DescriptorCache) -> bool {
    matches!(
        cache.descriptor(ty).shape(),
        Shape::Scalar(ScalarKind::Byte)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::descriptor::Describe;
    use crate::marshal::layout::ObjectLayout;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    struct Widget;

    impl Describe for Widget {
        fn describe() -> TypeDescriptor {
            ObjectLayout::builder::<Self>().build()
        }
    }

    fn classify_of<T: Describe>() -> Classification {
        let cache = DescriptorCache::new();
        cache.classify(TypeRef::of::<T>())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(classify_of::<String>(), Classification::Scalar(ScalarKind::Text));
        assert_eq!(classify_of::<bool>(), Classification::Scalar(ScalarKind::Bool));
        assert_eq!(
            classify_of::<DateTime<Utc>>(),
            Classification::Scalar(ScalarKind::DateTime)
        );
        assert_eq!(classify_of::<i16>(), Classification::Scalar(ScalarKind::Int16));
        assert_eq!(classify_of::<f32>(), Classification::Scalar(ScalarKind::Float32));
        assert_eq!(classify_of::<Decimal>(), Classification::Scalar(ScalarKind::Decimal));
        assert_eq!(classify_of::<u8>(), Classification::Scalar(ScalarKind::Byte));
        assert_eq!(classify_of::<char>(), Classification::Scalar(ScalarKind::Char));
    }

    #[test]
    fn test_sequence_of_scalars() {
        assert_eq!(
            classify_of::<Vec<i64>>(),
            Classification::Sequence {
                element: TypeRef::of::<i64>(),
                family: ElementFamily::Scalar(ScalarKind::Int64),
            }
        );
    }

    #[test]
    fn test_sequence_of_byte_sequences_is_blob_family() {
        assert_eq!(
            classify_of::<Vec<Vec<u8>>>(),
            Classification::Sequence {
                element: TypeRef::of::<Vec<u8>>(),
                family: ElementFamily::Blob,
            }
        );
    }

    #[test]
    fn test_sequence_of_complex_and_nested_sequences_is_composite() {
        assert!(matches!(
            classify_of::<Vec<Widget>>(),
            Classification::Sequence { family: ElementFamily::Composite, .. }
        ));
        assert!(matches!(
            classify_of::<Vec<Vec<i32>>>(),
            Classification::Sequence { family: ElementFamily::Composite, .. }
        ));
    }

    #[test]
    fn test_everything_else_is_complex() {
        assert_eq!(classify_of::<Widget>(), Classification::Complex);
    }
}
