//! Value transformation.
//!
//! A value mapping that matches the stringified source value wins outright.
//! Otherwise the target datatype decides: dates are normalized, booleans and
//! integers are parsed, strings and codes are stringified, and the complex
//! datatypes are built around the stringified value. Anything that fails to
//! parse passes through unconverted and is left for coercion to judge.

use fhirmap_model::{
    CodeableConcept, Coding, ContactPoint, FhirDataType, FieldMapping, Identifier, SourceValue,
    ValueMapping,
};
use serde_json::Value;
use tracing::trace;

use crate::datetime::to_fhir_date;

/// The result of transforming one source value.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformedValue {
    /// The source value, unconverted.
    Original(SourceValue),
    Text(String),
    Boolean(bool),
    Integer(i64),
    CodeableConcept(CodeableConcept),
    Identifier(Identifier),
    ContactPoint(ContactPoint),
}

impl TransformedValue {
    /// Name of the value's shape, used in coercion messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Original(value) => value.type_name(),
            Self::Text(_) => "String",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::CodeableConcept(_) => "CodeableConcept",
            Self::Identifier(_) => "Identifier",
            Self::ContactPoint(_) => "ContactPoint",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Original(SourceValue::Null))
    }

    /// Textual form for primitive targets; `None` for complex values and null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Original(SourceValue::Null) => None,
            Self::Original(value) => Some(value.to_string()),
            Self::Text(text) => Some(text.clone()),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::CodeableConcept(_) | Self::Identifier(_) | Self::ContactPoint(_) => None,
        }
    }

    /// FHIR JSON for the complex datatypes.
    pub fn complex_json(&self) -> Option<Value> {
        let json = match self {
            Self::CodeableConcept(concept) => serde_json::to_value(concept),
            Self::Identifier(identifier) => serde_json::to_value(identifier),
            Self::ContactPoint(point) => serde_json::to_value(point),
            _ => return None,
        };
        json.ok()
    }
}

/// Transforms a raw source value according to its field mapping.
pub fn transform_value(raw: &SourceValue, mapping: &FieldMapping) -> TransformedValue {
    if raw.is_null() {
        return TransformedValue::Original(SourceValue::Null);
    }
    let text = raw.to_string();

    if let Some(value_mapping) = mapping.find_value_mapping(&text) {
        return mapped_value(&text, value_mapping, mapping);
    }

    match &mapping.target_data_type {
        FhirDataType::Date | FhirDataType::DateTime => match to_fhir_date(raw) {
            Some(date) => TransformedValue::Text(date),
            None => {
                trace!(field = %mapping.source_field, "date value did not parse");
                TransformedValue::Original(raw.clone())
            }
        },
        FhirDataType::Boolean => match raw {
            SourceValue::Boolean(value) => TransformedValue::Boolean(*value),
            _ => parse_bool(&text)
                .map_or_else(|| TransformedValue::Original(raw.clone()), TransformedValue::Boolean),
        },
        FhirDataType::Integer => match raw {
            SourceValue::Integer(value) => TransformedValue::Integer(*value),
            _ => text
                .trim()
                .parse::<i32>()
                .map_or_else(
                    |_| TransformedValue::Original(raw.clone()),
                    |value| TransformedValue::Integer(i64::from(value)),
                ),
        },
        FhirDataType::String | FhirDataType::Code => TransformedValue::Text(text),
        FhirDataType::CodeableConcept => TransformedValue::CodeableConcept(CodeableConcept {
            coding: vec![Coding {
                system: mapping.system.clone(),
                code: None,
                display: Some(text),
            }],
            text: None,
        }),
        FhirDataType::Identifier => TransformedValue::Identifier(Identifier {
            system: mapping.system.clone(),
            value: Some(text),
        }),
        FhirDataType::ContactPoint => TransformedValue::ContactPoint(contact_point(text, mapping)),
        FhirDataType::Other(_) => TransformedValue::Original(raw.clone()),
    }
}

/// Builds the target of a value-mapping hit. Coded and typed targets carry
/// the mapped code and system; everything else receives the target value.
fn mapped_value(
    text: &str,
    value_mapping: &ValueMapping,
    mapping: &FieldMapping,
) -> TransformedValue {
    let code = value_mapping.target_value.clone();
    match &mapping.target_data_type {
        FhirDataType::CodeableConcept => TransformedValue::CodeableConcept(CodeableConcept {
            coding: vec![Coding {
                system: value_mapping
                    .target_system
                    .clone()
                    .or_else(|| mapping.system.clone()),
                code: Some(code),
                display: Some(text.to_string()),
            }],
            text: None,
        }),
        FhirDataType::Identifier => TransformedValue::Identifier(Identifier {
            system: value_mapping
                .target_system
                .clone()
                .or_else(|| mapping.system.clone()),
            value: Some(code),
        }),
        FhirDataType::ContactPoint => TransformedValue::ContactPoint(contact_point(code, mapping)),
        _ => TransformedValue::Text(code),
    }
}

/// Unrecognised system or use text leaves the field unset.
fn contact_point(value: String, mapping: &FieldMapping) -> ContactPoint {
    ContactPoint {
        system: mapping
            .system
            .as_deref()
            .and_then(|system| system.parse().ok()),
        value: Some(value),
        r#use: mapping
            .r#use
            .as_deref()
            .and_then(|use_code| use_code.parse().ok()),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use fhirmap_model::{ContactPointSystem, ContactPointUse};

    use super::*;

    #[test]
    fn unparseable_values_pass_through() {
        let mapping = FieldMapping::new("Active", "Patient.active", "boolean");
        assert_eq!(
            transform_value(&"yes".into(), &mapping),
            TransformedValue::Original("yes".into())
        );
        assert_eq!(
            transform_value(&"TRUE".into(), &mapping),
            TransformedValue::Boolean(true)
        );

        let mapping = FieldMapping::new("Births", "Patient.multipleBirthInteger", "integer");
        assert_eq!(
            transform_value(&" 2 ".into(), &mapping),
            TransformedValue::Integer(2)
        );
        assert_eq!(
            transform_value(&"2.5".into(), &mapping),
            TransformedValue::Original("2.5".into())
        );
    }

    #[test]
    fn invalid_contact_point_codes_stay_unset() {
        let mapping = FieldMapping::new("Pager", "Patient.telecom", "ContactPoint")
            .with_system("carrier-pigeon")
            .with_use("Mobile");
        let TransformedValue::ContactPoint(point) = transform_value(&"555-0100".into(), &mapping)
        else {
            panic!("expected a contact point");
        };
        assert_eq!(point.system, None);
        assert_eq!(point.r#use, Some(ContactPointUse::Mobile));
        assert_eq!(point.value.as_deref(), Some("555-0100"));
    }

    #[test]
    fn contact_point_system_is_parsed_from_mapping() {
        let mapping =
            FieldMapping::new("Email", "Patient.telecom", "ContactPoint").with_system("EMAIL");
        let TransformedValue::ContactPoint(point) = transform_value(&"a@b.org".into(), &mapping)
        else {
            panic!("expected a contact point");
        };
        assert_eq!(point.system, Some(ContactPointSystem::Email));
        assert_eq!(point.r#use, None);
    }
}
