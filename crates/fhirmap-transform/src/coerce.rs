//! Fitting transformed values into element definitions.

use fhirmap_standards::ElementDefinition;
use serde_json::{Map, Number, Value};

use crate::datetime::{is_fhir_date, is_fhir_datetime};
use crate::error::TransformError;
use crate::value::TransformedValue;

/// Converts a transformed value into the FHIR JSON of `element`'s type.
///
/// Null values are the caller's concern and are rejected here.
pub fn coerce(
    value: &TransformedValue,
    element: &ElementDefinition,
) -> Result<Value, TransformError> {
    let incompatible = || TransformError::Incompatible {
        from: value.kind(),
        element: element.path,
        type_name: element.type_name,
    };
    let invalid = || TransformError::InvalidFormat {
        element: element.path,
        type_name: element.type_name,
    };

    match element.type_name {
        "string" | "markdown" | "uri" => {
            value.as_text().map(Value::String).ok_or_else(incompatible)
        }
        "code" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            let code = text.trim();
            if code.is_empty() {
                return Err(invalid());
            }
            if let Some(codes) = element.binding
                && !codes.contains(&code)
            {
                return Err(TransformError::OutsideBinding {
                    element: element.path,
                });
            }
            Ok(Value::String(code.to_string()))
        }
        "date" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            if is_fhir_date(&text) {
                Ok(Value::String(text))
            } else {
                Err(invalid())
            }
        }
        "dateTime" | "instant" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            if is_fhir_datetime(&text) {
                Ok(Value::String(text))
            } else {
                Err(invalid())
            }
        }
        "boolean" => match value {
            TransformedValue::Boolean(flag) => Ok(Value::Bool(*flag)),
            _ => {
                let text = value.as_text().ok_or_else(incompatible)?;
                match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(invalid()),
                }
            }
        },
        "integer" | "positiveInt" | "unsignedInt" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            let parsed: i64 = text.trim().parse().map_err(|_| invalid())?;
            let parsed = i32::try_from(parsed).map_err(|_| TransformError::OutOfRange {
                element: element.path,
            })?;
            Ok(Value::from(parsed))
        }
        "decimal" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            text.trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        "Reference" => {
            let text = value.as_text().ok_or_else(incompatible)?;
            let mut reference = Map::new();
            reference.insert("reference".to_string(), Value::String(text));
            Ok(Value::Object(reference))
        }
        "CodeableConcept" => match value {
            TransformedValue::CodeableConcept(_) => value.complex_json().ok_or_else(incompatible),
            _ => Err(incompatible()),
        },
        "Identifier" => match value {
            TransformedValue::Identifier(_) => value.complex_json().ok_or_else(incompatible),
            _ => Err(incompatible()),
        },
        "ContactPoint" => match value {
            TransformedValue::ContactPoint(_) => value.complex_json().ok_or_else(incompatible),
            _ => Err(incompatible()),
        },
        _ => Err(incompatible()),
    }
}
