//! Legacy source records.
//!
//! Source data is an ordered string-keyed map; the engine never inspects a
//! record beyond iterating its keys and reading values by name.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single field value of a source record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SourceValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime type name reported as `sourceType` during analysis.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::Text(_) => "String",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(value) => Value::Bool(*value),
            Self::Integer(value) => Value::from(*value),
            Self::Decimal(value) => Value::from(*value),
            other => Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<Value> for SourceValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Boolean(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Integer(value),
                None => number.as_f64().map_or(Self::Null, Self::Decimal),
            },
            Value::String(text) => Self::Text(text),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SourceValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for SourceValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SourceValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for SourceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SourceValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SourceValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDate> for SourceValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for SourceValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<SourceValue>> From<Option<T>> for SourceValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A legacy record: field names in their natural order with their values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    fields: IndexMap<String, SourceValue>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SourceValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Reads a field by exact name. `None` means the record has no such field,
    /// which is distinct from a field holding [`SourceValue::Null`].
    pub fn get(&self, name: &str) -> Option<&SourceValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SourceValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl<K: Into<String>, V: Into<SourceValue>> FromIterator<(K, V)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_object_keeps_field_order_and_types() {
        let record = SourceRecord::from_json_str(
            r#"{"LastName":"Doe","Age":42,"Active":true,"Weight":71.5,"Middle":null}"#,
        )
        .unwrap();
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["LastName", "Age", "Active", "Weight", "Middle"]);
        assert_eq!(record.get("Age"), Some(&SourceValue::Integer(42)));
        assert_eq!(record.get("Active").map(SourceValue::type_name), Some("Boolean"));
        assert_eq!(record.get("Weight").map(SourceValue::type_name), Some("Decimal"));
        assert!(record.get("Middle").is_some_and(SourceValue::is_null));
        assert!(record.get("Missing").is_none());
    }

    #[test]
    fn dates_stringify_as_iso() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(SourceValue::from(date).to_string(), "1970-01-01");
        let value: SourceValue = Option::<&str>::None.into();
        assert!(value.is_null());
    }
}
