// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Complex Object Codec
//!
//! Encodes an object as a map of its non-null properties, keyed by the exact
//! property name. Decoding is two-phase:
//!
//! 1. Pick the widest constructor and feed it the wire entries whose keys
//!    match its parameter names, ignoring case.
//! 2. Assign the remaining matching entries through property setters.
//!
//! Entries matching nothing are dropped under [`DecodePolicy::Lenient`] and
//! rejected under [`DecodePolicy::Strict`].

use std::any::Any;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::wire::{AttributeMap, WireValue};
use crate::marshal::classifier::Classification;
use crate::marshal::descriptor::AnyBox;
use crate::marshal::error::MarshalError;
use crate::marshal::layout::{Arguments, Constructor, ObjectLayout, Parameter};
use crate::marshal::{sequence, DecodePolicy, Marshaller};

pub(crate) fn encode(
    marshaller: &Marshaller,
    layout: &ObjectLayout,
    value: &dyn Any,
) -> Result<WireValue, MarshalError> {
    let mut map = AttributeMap::new();
    for property in layout.properties() {
        if let Some(current) = property.get(value)? {
            let wire = marshaller.encode_value(property.ty(), current)?;
            map.insert(property.name().to_string(), wire);
        }
    }
    Ok(WireValue::Map(map))
}

pub(crate) fn decode(
    marshaller: &Marshaller,
    layout: &ObjectLayout,
    wire: &WireValue,
) -> Result<AnyBox, MarshalError> {
    let type_name = layout.ty().name();
    let constructor = layout
        .select_constructor()
        .ok_or(MarshalError::NoEligibleConstructor { type_name })?;
    let map = wire.as_map().ok_or(MarshalError::WireShapeMismatch {
        expected: "M",
        found: wire.variant_name(),
    })?;

    let entries = fold_keys(map)?;
    if marshaller.policy() == DecodePolicy::Strict {
        reject_unknown(layout, constructor, map)?;
    }

    let mut consumed = HashSet::new();
    let mut arguments = Arguments::new(type_name);
    for parameter in constructor.parameters() {
        let folded = parameter.name().to_lowercase();
        let value = match entries.get(folded.as_str()) {
            Some(entry) => marshaller.decode_value(parameter.ty(), entry)?,
            None => absent_argument(marshaller, type_name, parameter)?,
        };
        consumed.insert(folded);
        arguments.push(parameter.name(), value);
    }

    let mut instance = constructor.invoke(&mut arguments)?;

    for property in layout.properties() {
        let folded = property.name().to_lowercase();
        if consumed.contains(&folded) {
            continue;
        }
        let Some(entry) = entries.get(folded.as_str()) else {
            continue;
        };
        if property.is_settable() {
            let value = marshaller.decode_value(property.ty(), entry)?;
            property.set(&mut *instance, value)?;
        }
        consumed.insert(folded);
    }

    for key in map.keys() {
        if !consumed.contains(&key.to_lowercase()) {
            debug!(type_name, key = %key, "Dropping wire entry with no matching member");
        }
    }

    Ok(instance)
}

/// Indexes entries by lower-cased key.
fn fold_keys(map: &AttributeMap) -> Result<HashMap<String, &WireValue>, MarshalError> {
    let mut entries = HashMap::with_capacity(map.len());
    for (key, value) in map {
        if entries.insert(key.to_lowercase(), value).is_some() {
            return Err(MarshalError::DuplicateKey { key: key.clone() });
        }
    }
    Ok(entries)
}

fn reject_unknown(
    layout: &ObjectLayout,
    constructor: &Constructor,
    map: &AttributeMap,
) -> Result<(), MarshalError> {
    let known: HashSet<String> = constructor
        .parameters()
        .iter()
        .map(|parameter| parameter.name().to_lowercase())
        .chain(
            layout
                .properties()
                .iter()
                .map(|property| property.name().to_lowercase()),
        )
        .collect();

    match map.keys().find(|key| !known.contains(&key.to_lowercase())) {
        Some(field) => Err(MarshalError::UnknownField {
            type_name: layout.ty().name(),
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

/// Lenient decoding fills an absent sequence argument with an empty
/// collection. Anything else is a hard failure.
fn absent_argument(
    marshaller: &Marshaller,
    type_name: &'static str,
    parameter: &Parameter,
) -> Result<AnyBox, MarshalError> {
    let missing = MarshalError::MissingConstructorArgument {
        type_name,
        parameter: parameter.name(),
    };
    if marshaller.policy() == DecodePolicy::Strict {
        return Err(missing);
    }
    match marshaller.classify(parameter.ty()) {
        Classification::Sequence { .. } => {
            let descriptor = marshaller.cache().descriptor(parameter.ty());
            let layout = descriptor.as_sequence().ok_or(missing)?;
            sequence::empty(layout)
        }
        _ => Err(missing),
    }
}
