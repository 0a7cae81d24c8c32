use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A YAML document value.
///
/// Mappings keep their key order, so a document survives a
/// load-migrate-save round trip without reshuffling keys the migration
/// never looked at.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value. Floats and numeric strings do not count;
    /// there is no coercion.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(seq: Vec<Value>) -> Self {
        Self::Sequence(seq)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

// ============================================================================
// Serde mapping (hand-written so the YAML data model maps exactly)
// ============================================================================

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(seq) => serializer.collect_seq(seq),
            Self::Mapping(map) => serializer.collect_map(map),
        }
    }
}

/// Mapping key. Only strings are accepted; a scalar key of any other type
/// fails deserialization instead of being stringified.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = MapKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string key")
            }

            fn visit_str<E>(self, s: &str) -> std::result::Result<MapKey, E> {
                Ok(MapKey(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> std::result::Result<MapKey, E> {
                Ok(MapKey(s))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YAML value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_bool<E>(self, b: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(b))
            }

            fn visit_i64<E>(self, i: i64) -> std::result::Result<Value, E> {
                Ok(Value::Integer(i))
            }

            fn visit_u64<E>(self, u: u64) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                i64::try_from(u)
                    .map(Value::Integer)
                    .map_err(|_| E::custom(format!("integer {} is out of range", u)))
            }

            fn visit_f64<E>(self, f: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(f))
            }

            fn visit_str<E>(self, s: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> std::result::Result<Value, E> {
                Ok(Value::String(s))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element()? {
                    values.push(value);
                }
                Ok(Value::Sequence(values))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<MapKey, Value>()? {
                    fields.insert(key.0, value);
                }
                Ok(Value::Mapping(fields))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_key_order() {
        let text = "zeta: 1\nalpha:\n- true\n- null\nname: example\n";
        let value: Value = serde_yaml::from_str(text).unwrap();
        let rendered = serde_yaml::to_string(&value).unwrap();
        assert_eq!(rendered, text);
    }

    #[test]
    fn test_integer_overflow_rejected() {
        let err = serde_yaml::from_str::<Value>("id: 18446744073709551615").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_non_string_keys_rejected() {
        for text in ["1: a\n", "true: b\n", "1.5: c\n", "outer:\n  1: a\n"] {
            let err = serde_yaml::from_str::<Value>(text).unwrap_err();
            assert!(
                err.to_string().contains("expected a string key"),
                "{}: {}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_quoted_scalar_keys_are_strings() {
        let value: Value = serde_yaml::from_str("'1': a\n").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("1").and_then(Value::as_str), Some("a"));
    }

    #[test]
    fn test_accessors_do_not_coerce() {
        assert_eq!(Value::Integer(42).as_i64(), Some(42));
        assert_eq!(Value::Float(42.0).as_i64(), None);
        assert_eq!(Value::String("42".to_string()).as_i64(), None);
        assert_eq!(Value::Integer(2).as_f64(), Some(2.0));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(1i64), Value::Integer(1));
        assert_eq!(Value::from(true), Value::Bool(true));
    }
}
