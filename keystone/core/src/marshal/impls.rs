// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Built-in descriptors for scalar types and `Vec<T>`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::marshal::descriptor::{Describe, ScalarKind, TypeDescriptor};

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::scalar::<$ty>(ScalarKind::$kind)
                }
            }
        )*
    };
}

impl_scalar!(
    String => Text,
    bool => Bool,
    DateTime<Utc> => DateTime,
    Uuid => Uuid,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    u8 => Byte,
    char => Char,
);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<T>()
    }
}
