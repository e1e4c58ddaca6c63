// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Wire Value
//!
//! Self-describing tagged value exchanged with key-value backends. Exactly one
//! variant is populated per value; a null is expressed by leaving the entry out
//! of the enclosing map, never by an empty variant.
//!
//! Numbers travel as canonical decimal text so that no precision is lost
//! between the scalar widths a domain model may use.
//!
//! The serde form mirrors the attribute-value JSON used by document stores:
//!
//! ```json
//! {"M": {"Name": {"S": "Ada"}, "Age": {"N": "36"}, "Tags": {"SS": ["a", "b"]}}}
//! ```

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Property bag of a complex object: field name to wire value.
pub type AttributeMap = BTreeMap<String, WireValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireValue {
    #[serde(rename = "S")]
    Str(String),

    #[serde(rename = "N")]
    Num(String),

    #[serde(rename = "BOOL")]
    Bool(bool),

    #[serde(rename = "B")]
    Bytes(#[serde(with = "base64_blob")] Bytes),

    #[serde(rename = "SS")]
    StrSet(Vec<String>),

    #[serde(rename = "NS")]
    NumSet(Vec<String>),

    #[serde(rename = "BS")]
    BytesSet(#[serde(with = "base64_blob_set")] Vec<Bytes>),

    #[serde(rename = "L")]
    List(Vec<WireValue>),

    #[serde(rename = "M")]
    Map(AttributeMap),
}

impl WireValue {
    /// Short tag of the populated variant, as it appears in the JSON form.
    pub fn variant_name(&self) -> &'static str {
        match self {
            WireValue::Str(_) => "S",
            WireValue::Num(_) => "N",
            WireValue::Bool(_) => "BOOL",
            WireValue::Bytes(_) => "B",
            WireValue::StrSet(_) => "SS",
            WireValue::NumSet(_) => "NS",
            WireValue::BytesSet(_) => "BS",
            WireValue::List(_) => "L",
            WireValue::Map(_) => "M",
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            WireValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<AttributeMap> {
        match self {
            WireValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<&str> {
        match self {
            WireValue::Num(text) => Some(text),
            _ => None,
        }
    }
}

impl From<AttributeMap> for WireValue {
    fn from(map: AttributeMap) -> Self {
        WireValue::Map(map)
    }
}

mod base64_blob {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blob: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(blob))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

mod base64_blob_set {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(blobs: &[Bytes], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<String> = blobs.iter().map(|blob| STANDARD.encode(blob)).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Bytes>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|text| {
                STANDARD
                    .decode(text.as_bytes())
                    .map(Bytes::from)
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape_uses_attribute_tags() {
        let mut map = AttributeMap::new();
        map.insert("Name".to_string(), WireValue::Str("Ada".to_string()));
        map.insert("Age".to_string(), WireValue::Num("36".to_string()));
        map.insert("Active".to_string(), WireValue::Bool(true));

        let json = serde_json::to_value(WireValue::Map(map)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "M": {
                    "Active": {"BOOL": true},
                    "Age": {"N": "36"},
                    "Name": {"S": "Ada"}
                }
            })
        );
    }

    #[test]
    fn test_blobs_serialize_as_base64() {
        let value = WireValue::BytesSet(vec![Bytes::from_static(b"hi"), Bytes::new()]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"BS":["aGk=",""]}"#);

        let parsed: WireValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result: Result<WireValue, _> = serde_json::from_str(r#"{"B":"***"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_variant_accessors() {
        let value = WireValue::Num("1.5".to_string());
        assert_eq!(value.variant_name(), "N");
        assert_eq!(value.as_num(), Some("1.5"));
        assert!(value.as_str().is_none());
        assert!(value.clone().into_map().is_none());

        let map = WireValue::from(AttributeMap::new());
        assert_eq!(map.variant_name(), "M");
        assert!(map.as_map().unwrap().is_empty());
    }
}
