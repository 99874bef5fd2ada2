//! Value-normalization rules keyed by resource type and source field name.
//!
//! Adding a rule means adding a row to [`VALUE_RULES`]; the analyzer loop
//! does not change.

use fhirmap_model::{ValueMapping, ValueMappingCandidate};

pub const ADMINISTRATIVE_GENDER_SYSTEM: &str = "http://hl7.org/fhir/administrative-gender";

/// Members of the administrative-gender value set.
pub const ADMINISTRATIVE_GENDER_CODES: &[&str] = &["male", "female", "other", "unknown"];

/// Proposes a value mapping for one stringified source value.
pub type ValueNormalizer = fn(&str) -> Option<ValueMappingCandidate>;

#[derive(Debug, Clone, Copy)]
pub struct ValueRule {
    pub resource_type: &'static str,
    /// Source field names the rule applies to, compared ignoring ASCII case.
    pub field_names: &'static [&'static str],
    pub normalize: ValueNormalizer,
}

impl ValueRule {
    pub fn applies_to(&self, field_name: &str) -> bool {
        self.field_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(field_name))
    }
}

static VALUE_RULES: &[ValueRule] = &[ValueRule {
    resource_type: "Patient",
    field_names: &["Gender", "Sex"],
    normalize: administrative_gender,
}];

pub fn value_rules_for(resource_type: &str) -> impl Iterator<Item = &'static ValueRule> {
    VALUE_RULES
        .iter()
        .filter(move |rule| rule.resource_type == resource_type)
}

/// Maps free-text sex/gender values onto administrative-gender codes.
///
/// Anything unrecognised becomes `unknown` with a lower confidence. Empty
/// values produce nothing.
pub fn administrative_gender(raw: &str) -> Option<ValueMappingCandidate> {
    if raw.is_empty() {
        return None;
    }
    let (code, confidence) = match raw.to_lowercase().as_str() {
        "m" | "male" => ("male", 0.9),
        "f" | "female" => ("female", 0.9),
        "o" | "other" => ("other", 0.9),
        _ => ("unknown", 0.5),
    };
    Some(ValueMappingCandidate::new(
        ValueMapping::new(raw, code).with_system(ADMINISTRATIVE_GENDER_SYSTEM),
        confidence,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_values_normalize_ignoring_case() {
        let male = administrative_gender("M").unwrap();
        assert_eq!(male.value_mapping.source_value, "M");
        assert_eq!(male.value_mapping.target_value, "male");
        assert_eq!(
            male.value_mapping.target_system.as_deref(),
            Some(ADMINISTRATIVE_GENDER_SYSTEM)
        );
        assert!((male.confidence - 0.9).abs() < f64::EPSILON);

        assert_eq!(administrative_gender("Female").unwrap().value_mapping.target_value, "female");
        assert_eq!(administrative_gender("o").unwrap().value_mapping.target_value, "other");

        let fallback = administrative_gender("X").unwrap();
        assert_eq!(fallback.value_mapping.target_value, "unknown");
        assert!((fallback.confidence - 0.5).abs() < f64::EPSILON);

        assert!(administrative_gender("").is_none());
    }

    #[test]
    fn rules_are_keyed_by_resource_and_field() {
        let rules: Vec<_> = value_rules_for("Patient").collect();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].applies_to("sex"));
        assert!(rules[0].applies_to("GENDER"));
        assert!(!rules[0].applies_to("GenderIdentity"));
        assert_eq!(value_rules_for("Condition").count(), 0);
    }
}
