use crate::error::{CoreError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record as held by the persistent store: field names mapped to values.
///
/// No schema is imposed. The record wraps an `IndexMap` so the field order
/// of the store row is kept through serialization, which makes the cached
/// form byte-stable for the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record {
    inner: IndexMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    /// Returns a reference to the internal map.
    pub fn as_inner(&self) -> &IndexMap<String, Value> {
        &self.inner
    }

    /// Consumes the record and returns the internal map.
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.inner
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.inner.insert(field.into(), value.into());
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Retrieves a field, supporting dot notation for nested objects.
    ///
    /// # Example
    /// ```
    /// # use aside_core::Record;
    /// let record = Record::from_json(r#"{"user": {"name": "x"}}"#).unwrap();
    /// assert_eq!(record.get("user.name").and_then(|v| v.as_str()), Some("x"));
    /// ```
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }

        // Fast path for simple fields
        if !path.contains('.') {
            return self.inner.get(path);
        }

        let mut parts = path.split('.');
        let mut current = self.inner.get(parts.next()?)?;

        for part in parts {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                },
                _ => return None,
            }
        }

        Some(current)
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    /// Parses a JSON object into a Record.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::invalid_record(e.to_string()))
    }

    /// Converts an arbitrary JSON value into a Record.
    ///
    /// Only objects are accepted; any other JSON shape is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(CoreError::invalid_record(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Converts the record into a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.inner
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(map: IndexMap<String, Value>) -> Self {
        Record { inner: map }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Record {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_access() {
        let record = Record::from_json(
            r#"{"id": 7, "profile": {"name": "x", "address": {"city": "Lima"}}}"#,
        )
        .unwrap();

        assert_eq!(record.get("id").and_then(Value::as_i64), Some(7));
        assert_eq!(
            record.get("profile.address.city").and_then(Value::as_str),
            Some("Lima")
        );
        assert_eq!(record.get("profile.missing"), None);
        assert_eq!(record.get("id.sub"), None);
        assert_eq!(record.get(""), None);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let record = Record::new().with("z", 1).with("a", 2).with("m", 3);
        let fields: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(fields, vec!["z", "a", "m"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!({"id": 1})).is_ok());
        let err = Record::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(Record::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_to_value() {
        let record = Record::new().with("id", 7).with("name", "x");
        assert_eq!(record.to_value(), json!({"id": 7, "name": "x"}));
    }
}
