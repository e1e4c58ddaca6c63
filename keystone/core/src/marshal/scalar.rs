// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Scalar Codec
//!
//! Converts leaf values to and from their wire form.
//!
//! | Kind | Wire leaf | Text form |
//! |------|-----------|-----------|
//! | text, char | `S` | as is |
//! | bool | `BOOL` | `true` / `false` inside sets |
//! | date/time | `S` | RFC 3339, UTC, `Z` suffix |
//! | uuid | `S` | hyphenated lowercase |
//! | integers, floats, decimal, byte | `N` | invariant decimal text |
//! | enum | `S` | member name |
//!
//! Non-finite floats have no decimal form and fail with
//! [`MarshalError::MalformedScalar`] in both directions.
//!
//! [`render`] and [`parse`] work on the bare text and are shared with the
//! sequence codec and key encoding; [`encode`] and [`decode`] wrap them in the
//! matching leaf variant.

use std::any::Any;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::wire::WireValue;
use crate::marshal::descriptor::{AnyBox, ScalarKind};
use crate::marshal::error::MarshalError;

pub fn encode(kind: ScalarKind, value: &dyn Any) -> Result<WireValue, MarshalError> {
    match kind {
        ScalarKind::Bool => Ok(WireValue::Bool(*downcast::<bool>(value)?)),
        kind if kind.is_numeric() => render(kind, value).map(WireValue::Num),
        kind => render(kind, value).map(WireValue::Str),
    }
}

/// Decodes a leaf. A bool target accepts any leaf and reads everything but
/// `BOOL(true)` as `false`.
pub fn decode(kind: ScalarKind, wire: &WireValue) -> Result<AnyBox, MarshalError> {
    match (kind, wire) {
        (ScalarKind::Bool, WireValue::Bool(flag)) => Ok(Box::new(*flag)),
        (ScalarKind::Bool, _) => Ok(Box::new(false)),
        (kind, WireValue::Num(text)) if kind.is_numeric() => parse(kind, text),
        (kind, WireValue::Str(text)) if !kind.is_numeric() => parse(kind, text),
        (kind, other) => Err(MarshalError::WireShapeMismatch {
            expected: leaf_variant(kind),
            found: other.variant_name(),
        }),
    }
}

/// Wire leaf tag used for `kind`.
pub fn leaf_variant(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "BOOL",
        kind if kind.is_numeric() => "N",
        _ => "S",
    }
}

pub fn render(kind: ScalarKind, value: &dyn Any) -> Result<String, MarshalError> {
    match kind {
        ScalarKind::Text => downcast::<String>(value).cloned(),
        ScalarKind::Bool => display::<bool>(value),
        ScalarKind::DateTime => downcast::<DateTime<Utc>>(value)
            .map(|instant| instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        ScalarKind::Uuid => display::<Uuid>(value),
        ScalarKind::Int8 => display::<i8>(value),
        ScalarKind::Int16 => display::<i16>(value),
        ScalarKind::Int32 => display::<i32>(value),
        ScalarKind::Int64 => display::<i64>(value),
        ScalarKind::UInt16 => display::<u16>(value),
        ScalarKind::UInt32 => display::<u32>(value),
        ScalarKind::UInt64 => display::<u64>(value),
        ScalarKind::Float32 => {
            downcast::<f32>(value).and_then(|v| finite(*v, v.is_finite(), kind))
        }
        ScalarKind::Float64 => {
            downcast::<f64>(value).and_then(|v| finite(*v, v.is_finite(), kind))
        }
        ScalarKind::Decimal => display::<Decimal>(value),
        ScalarKind::Byte => display::<u8>(value),
        ScalarKind::Char => display::<char>(value),
        ScalarKind::Enum(descriptor) => descriptor.member_name(value).map(str::to_string),
    }
}

pub fn parse(kind: ScalarKind, text: &str) -> Result<AnyBox, MarshalError> {
    match kind {
        ScalarKind::Text => Ok(Box::new(text.to_string())),
        ScalarKind::Bool => parse_bool(text).map(|flag| Box::new(flag) as AnyBox),
        ScalarKind::DateTime => DateTime::parse_from_rfc3339(text)
            .map(|instant| Box::new(instant.with_timezone(&Utc)) as AnyBox)
            .map_err(|_| malformed(text, kind)),
        ScalarKind::Uuid => from_text::<Uuid>(text, kind),
        ScalarKind::Int8 => from_text::<i8>(text, kind),
        ScalarKind::Int16 => from_text::<i16>(text, kind),
        ScalarKind::Int32 => from_text::<i32>(text, kind),
        ScalarKind::Int64 => from_text::<i64>(text, kind),
        ScalarKind::UInt16 => from_text::<u16>(text, kind),
        ScalarKind::UInt32 => from_text::<u32>(text, kind),
        ScalarKind::UInt64 => from_text::<u64>(text, kind),
        ScalarKind::Float32 => match text.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(Box::new(v)),
            _ => Err(malformed(text, kind)),
        },
        ScalarKind::Float64 => match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Box::new(v)),
            _ => Err(malformed(text, kind)),
        },
        ScalarKind::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(|decimal| Box::new(decimal) as AnyBox)
            .map_err(|_| malformed(text, kind)),
        ScalarKind::Byte => from_text::<u8>(text, kind),
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Box::new(c)),
                _ => Err(malformed(text, kind)),
            }
        }
        ScalarKind::Enum(descriptor) => descriptor.parse(text),
    }
}

fn parse_bool(text: &str) -> Result<bool, MarshalError> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(malformed(text, ScalarKind::Bool))
    }
}

fn downcast<T: Any>(value: &dyn Any) -> Result<&T, MarshalError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(MarshalError::type_mismatch::<T>)
}

fn display<T: Any + ToString>(value: &dyn Any) -> Result<String, MarshalError> {
    downcast::<T>(value).map(ToString::to_string)
}

/// `N` leaves carry decimal text only; NaN and infinities have none.
fn finite<T: ToString>(
    value: T,
    is_finite: bool,
    kind: ScalarKind,
) -> Result<String, MarshalError> {
    let text = value.to_string();
    if is_finite {
        Ok(text)
    } else {
        Err(malformed(&text, kind))
    }
}

fn from_text<T>(text: &str, kind: ScalarKind) -> Result<AnyBox, MarshalError>
where
    T: FromStr + Send + 'static,
{
    text.parse::<T>()
        .map(|value| Box::new(value) as AnyBox)
        .map_err(|_| malformed(text, kind))
}

fn malformed(text: &str, kind: ScalarKind) -> MarshalError {
    MarshalError::MalformedScalar {
        text: text.to_string(),
        target: kind.name(),
    }
}
