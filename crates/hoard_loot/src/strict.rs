//! # Strict JSON Intake
//!
//! `serde_json::Value` silently keeps the last of two repeated keys. Authored
//! loot tables must not: a repeated `chance` is almost always a merge mistake.
//! [`parse_document`] builds the same `Value` tree but rejects repeated keys
//! with the parser's line and column.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::error::{LootError, LootResult};

/// Parses one authored document, rejecting repeated object keys.
///
/// # Errors
///
/// Returns [`LootError::Syntax`] for malformed JSON or a repeated key.
pub fn parse_document(asset: &str, text: &str) -> LootResult<Value> {
    serde_json::from_str::<StrictValue>(text)
        .map(|strict| strict.0)
        .map_err(|e| LootError::Syntax {
            asset: asset.to_string(),
            message: e.to_string(),
        })
}

struct StrictValue(Value);

impl<'de> Deserialize<'de> for StrictValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StrictVisitor).map(StrictValue)
    }
}

struct StrictVisitor;

impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        StrictValue::deserialize(deserializer).map(|strict| strict.0)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(StrictValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            let StrictValue(value) = map.next_value()?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_document() {
        let value = parse_document("t", r#"{"a": [1, -2, 3.5, "x", null, true], "b": {"c": 1}}"#)
            .unwrap();
        assert_eq!(value["a"][1], Value::from(-2));
        assert_eq!(value["a"][2], Value::from(3.5));
        assert_eq!(value["b"]["c"], Value::from(1));
    }

    #[test]
    fn test_rejects_duplicate_key() {
        let err = parse_document("chest.json", "{\"chance\": 10,\n \"chance\": 20}").unwrap_err();
        match err {
            LootError::Syntax { asset, message } => {
                assert_eq!(asset, "chest.json");
                assert!(message.contains("duplicate key `chance`"), "{message}");
                assert!(message.contains("line 2"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicates_in_sibling_objects_allowed() {
        let value = parse_document("t", r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(value[1]["id"], Value::from(2));
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = parse_document("t", "{\"a\": }").unwrap_err();
        assert!(matches!(err, LootError::Syntax { .. }));
    }
}
