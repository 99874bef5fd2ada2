//! Declarative mapping configuration.
//!
//! A [`MappingConfiguration`] describes how the fields of a legacy source
//! record populate one FHIR resource type. It is produced by the
//! configuration generator or hand-authored, and persisted as JSON with the
//! camelCase field names below.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Target path and type name used for source fields no rule recognises.
pub const UNKNOWN_TARGET: &str = "Unknown";

/// Target datatype of a field mapping.
///
/// Unrecognised names are kept verbatim in [`FhirDataType::Other`] so that a
/// configuration written by another tool round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FhirDataType {
    String,
    Code,
    Date,
    DateTime,
    Boolean,
    Integer,
    CodeableConcept,
    Identifier,
    ContactPoint,
    Other(String),
}

impl FhirDataType {
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "code" => Self::Code,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "CodeableConcept" => Self::CodeableConcept,
            "Identifier" => Self::Identifier,
            "ContactPoint" => Self::ContactPoint,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Code => "code",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::CodeableConcept => "CodeableConcept",
            Self::Identifier => "Identifier",
            Self::ContactPoint => "ContactPoint",
            Self::Other(name) => name,
        }
    }

    /// The placeholder type attached to unmatched source fields.
    pub fn unknown() -> Self {
        Self::Other(UNKNOWN_TARGET.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Other(name) if name == UNKNOWN_TARGET)
    }
}

impl From<String> for FhirDataType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for FhirDataType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<FhirDataType> for String {
    fn from(value: FhirDataType) -> Self {
        match value {
            FhirDataType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FhirDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal source value to coded target value substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMapping {
    pub source_value: String,
    pub target_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_system: Option<String>,
}

impl ValueMapping {
    pub fn new(source_value: impl Into<String>, target_value: impl Into<String>) -> Self {
        Self {
            source_value: source_value.into(),
            target_value: target_value.into(),
            target_system: None,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.target_system = Some(system.into());
        self
    }

    /// Case-insensitive exact comparison against a stringified source value.
    pub fn matches(&self, raw: &str) -> bool {
        self.source_value.to_lowercase() == raw.to_lowercase()
    }
}

/// One rule binding a source field to a target FHIR path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_fhir_path: String,
    pub target_data_type: FhirDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    #[serde(default)]
    pub allow_null: bool,
    #[serde(default)]
    pub value_mappings: Vec<ValueMapping>,
}

impl FieldMapping {
    pub fn new(
        source_field: impl Into<String>,
        target_fhir_path: impl Into<String>,
        target_data_type: impl Into<FhirDataType>,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            target_fhir_path: target_fhir_path.into(),
            target_data_type: target_data_type.into(),
            system: None,
            r#use: None,
            allow_null: false,
            value_mappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_use(mut self, use_code: impl Into<String>) -> Self {
        self.r#use = Some(use_code.into());
        self
    }

    #[must_use]
    pub fn allowing_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    #[must_use]
    pub fn with_value_mapping(mut self, mapping: ValueMapping) -> Self {
        self.value_mappings.push(mapping);
        self
    }

    /// First value mapping whose source value matches `raw`, ignoring case.
    pub fn find_value_mapping(&self, raw: &str) -> Option<&ValueMapping> {
        self.value_mappings.iter().find(|mapping| mapping.matches(raw))
    }
}

/// Declarative rule set for one FHIR resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfiguration {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
}

impl MappingConfiguration {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            profile: None,
            field_mappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, mapping: FieldMapping) -> Self {
        self.field_mappings.push(mapping);
        self
    }

    pub fn push(&mut self, mapping: FieldMapping) {
        self.field_mappings.push(mapping);
    }

    /// Returns true if any field mapping writes to exactly `path`.
    pub fn maps_target(&self, path: &str) -> bool {
        self.field_mappings
            .iter()
            .any(|mapping| mapping.target_fhir_path == path)
    }

    pub fn mapping_for_source(&self, source_field: &str) -> Option<&FieldMapping> {
        self.field_mappings
            .iter()
            .find(|mapping| mapping.source_field == source_field)
    }

    /// Source fields that appear in more than one field mapping, in first-seen order.
    pub fn duplicate_source_fields(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for mapping in &self.field_mappings {
            let field = mapping.source_field.as_str();
            if !seen.insert(field) && !duplicates.contains(&field) {
                duplicates.push(field);
            }
        }
        duplicates
    }

    /// Serializes to the persisted (pretty-printed JSON) form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_names_round_trip() {
        for name in [
            "string",
            "code",
            "date",
            "dateTime",
            "boolean",
            "integer",
            "CodeableConcept",
            "Identifier",
            "ContactPoint",
            "Unknown",
            "Quantity",
        ] {
            assert_eq!(FhirDataType::parse(name).as_str(), name);
        }
        assert!(FhirDataType::parse("Unknown").is_unknown());
        assert!(!FhirDataType::parse("DateTime").is_unknown());
    }

    #[test]
    fn value_mapping_matches_ignoring_case() {
        let mapping = ValueMapping::new("M", "male");
        assert!(mapping.matches("m"));
        assert!(mapping.matches("M"));
        assert!(!mapping.matches("male"));
    }

    #[test]
    fn duplicate_source_fields_listed_once() {
        let config = MappingConfiguration::new("Patient")
            .with_field(FieldMapping::new("Zip", "Patient.address.postalCode", "string"))
            .with_field(FieldMapping::new("City", "Patient.address.city", "string"))
            .with_field(FieldMapping::new("Zip", "Patient.address.city", "string"))
            .with_field(FieldMapping::new("Zip", "Patient.address.state", "string"));
        assert_eq!(config.duplicate_source_fields(), vec!["Zip"]);
    }

    #[test]
    fn persisted_form_uses_camel_case() {
        let config = MappingConfiguration::new("Patient")
            .with_profile("http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient")
            .with_field(
                FieldMapping::new("Phone", "Patient.telecom", "ContactPoint")
                    .with_system("phone")
                    .with_use("home"),
            );
        let json = config.to_json().unwrap();
        assert!(json.contains("\"resourceType\": \"Patient\""));
        assert!(json.contains("\"targetFhirPath\": \"Patient.telecom\""));
        assert!(json.contains("\"targetDataType\": \"ContactPoint\""));
        assert!(json.contains("\"use\": \"home\""));
        assert!(json.contains("\"allowNull\": false"));
        assert_eq!(MappingConfiguration::from_json(&json).unwrap(), config);
    }
}
