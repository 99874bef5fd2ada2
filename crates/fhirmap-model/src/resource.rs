//! FHIR resource values built by the mapping engine.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// `Resource.meta`. Elements other than `profile` (`versionId`,
/// `lastUpdated`, `tag`, ...) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.profile.is_empty() && self.other.is_empty()
    }
}

/// A FHIR resource: its type name, metadata and top-level elements.
///
/// Elements are held as JSON so that any resource type registered at
/// runtime can be represented without a dedicated Rust struct. Serialization
/// emits FHIR JSON with `resourceType` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    meta: Option<Meta>,
    elements: Map<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            meta: None,
            elements: Map::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn profiles(&self) -> &[String] {
        self.meta
            .as_ref()
            .map(|meta| meta.profile.as_slice())
            .unwrap_or_default()
    }

    /// Replaces `meta.profile` with the single given profile.
    pub fn set_profile(&mut self, profile: impl Into<String>) {
        self.meta.get_or_insert_with(Meta::default).profile = vec![profile.into()];
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.elements.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.elements.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.elements.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.elements.shift_remove(name)
    }

    /// Returns true if the element exists and carries content.
    pub fn has_element(&self, name: &str) -> bool {
        self.elements.get(name).is_some_and(has_content)
    }

    pub fn elements(&self) -> &Map<String, Value> {
        &self.elements
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Returns true unless the value is null, an empty string, or an empty array/object.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => items.iter().any(has_content),
        Value::Object(map) => map.values().any(has_content),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let has_meta = self.meta.as_ref().is_some_and(|meta| !meta.is_empty());
        let len = 1 + usize::from(has_meta) + self.elements.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("resourceType", &self.resource_type)?;
        if has_meta {
            map.serialize_entry("meta", &self.meta)?;
        }
        for (name, value) in &self.elements {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut elements = Map::deserialize(deserializer)?;
        let resource_type = match elements.shift_remove("resourceType") {
            Some(Value::String(name)) => name,
            _ => return Err(D::Error::missing_field("resourceType")),
        };
        let meta = match elements.shift_remove("meta") {
            Some(value) => Some(serde_json::from_value(value).map_err(D::Error::custom)?),
            None => None,
        };
        Ok(Self {
            resource_type,
            meta,
            elements,
        })
    }
}
