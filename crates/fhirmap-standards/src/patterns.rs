//! Field-name pattern catalog.
//!
//! Each resource type has an ordered list of rules matched against source
//! field names with a case-insensitive substring search. Rules with equal
//! confidence keep their list order when ranked; the first listed rule wins a
//! tie. The email rule therefore precedes the address and SSN rules
//! (`HomeEmailAddress` matches all three), address precedes SSN (`Address`
//! contains `ss`) and the work phone rule precedes the home phone rule.

use std::sync::LazyLock;

use fhirmap_model::FhirDataType;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// One field-name heuristic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRule {
    pub regex_pattern: &'static str,
    pub target_path: &'static str,
    pub target_data_type: &'static str,
    pub confidence: f64,
    #[serde(skip)]
    regex: Regex,
}

impl PatternRule {
    fn new(
        regex_pattern: &'static str,
        target_path: &'static str,
        target_data_type: &'static str,
        confidence: f64,
    ) -> Self {
        let regex = RegexBuilder::new(regex_pattern)
            .case_insensitive(true)
            .build()
            .expect("invalid pattern rule regex");
        Self {
            regex_pattern,
            target_path,
            target_data_type,
            confidence,
            regex,
        }
    }

    /// Substring search against a field name, ignoring case.
    pub fn is_match(&self, field_name: &str) -> bool {
        self.regex.is_match(field_name)
    }

    pub fn data_type(&self) -> FhirDataType {
        FhirDataType::parse(self.target_data_type)
    }
}

static PATIENT: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule::new(
            "(first|fname|firstname|first_name)",
            "Patient.name.given[0]",
            "string",
            0.9,
        ),
        PatternRule::new(
            "(last|lname|lastname|last_name|surname)",
            "Patient.name.family",
            "string",
            0.9,
        ),
        PatternRule::new(
            "(dob|birth|birthdate|dateofbirth|birth_date)",
            "Patient.birthDate",
            "date",
            0.9,
        ),
        PatternRule::new("(gender|sex)", "Patient.gender", "code", 0.8),
        // ahead of address and ssn, which `HomeEmailAddress` also matches
        PatternRule::new(
            "(email|mail)",
            "Patient.telecom[system='email']",
            "ContactPoint",
            0.8,
        ),
        // address components
        PatternRule::new(
            "(address|addr|street|line1)",
            "Patient.address.line[0]",
            "string",
            0.8,
        ),
        PatternRule::new("(city|town)", "Patient.address.city", "string", 0.9),
        PatternRule::new("(state|province)", "Patient.address.state", "string", 0.9),
        PatternRule::new(
            "(zip|postal|postalcode|zip_code)",
            "Patient.address.postalCode",
            "string",
            0.9,
        ),
        // identifiers
        PatternRule::new(
            "(ssn|socialsecurity|ss|social)",
            "Patient.identifier[system='http://hl7.org/fhir/sid/us-ssn']",
            "Identifier",
            0.8,
        ),
        PatternRule::new(
            "(mrn|medical|record|chart|chartid)",
            "Patient.identifier[system='http://hospital.smarthealthit.org']",
            "Identifier",
            0.7,
        ),
        // contact points
        PatternRule::new(
            "(work|workphone)",
            "Patient.telecom[system='phone'][use='work']",
            "ContactPoint",
            0.8,
        ),
        PatternRule::new(
            "(mobile|cell|cellphone)",
            "Patient.telecom[system='phone'][use='mobile']",
            "ContactPoint",
            0.8,
        ),
        PatternRule::new(
            "(phone|homephone|telephone)",
            "Patient.telecom[system='phone'][use='home']",
            "ContactPoint",
            0.8,
        ),
    ]
});

static CONDITION: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule::new(
            "(icd|diagnosis|code)",
            "Condition.code",
            "CodeableConcept",
            0.8,
        ),
        PatternRule::new(
            "(onset|start|begin|from)",
            "Condition.onset[x]",
            "dateTime",
            0.7,
        ),
        PatternRule::new(
            "(end|stop|resolved|abate)",
            "Condition.abatement[x]",
            "dateTime",
            0.7,
        ),
        PatternRule::new(
            "(status|active|inactive)",
            "Condition.clinicalStatus",
            "CodeableConcept",
            0.7,
        ),
    ]
});

/// Rules for a resource type, in catalog order. Unknown types have no rules.
pub fn patterns_for(resource_type: &str) -> &'static [PatternRule] {
    match resource_type {
        "Patient" => PATIENT.as_slice(),
        "Condition" => CONDITION.as_slice(),
        _ => &[],
    }
}

/// Resource types the catalog has rules for.
pub fn pattern_resource_types() -> &'static [&'static str] {
    &["Patient", "Condition"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles_and_carries_its_resource_prefix() {
        for resource_type in pattern_resource_types() {
            let rules = patterns_for(resource_type);
            assert!(!rules.is_empty());
            for rule in rules {
                assert!(rule.target_path.starts_with(resource_type));
                assert!((0.7..=0.9).contains(&rule.confidence));
            }
        }
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let email = patterns_for("Patient")
            .iter()
            .find(|rule| rule.target_path == "Patient.telecom[system='email']")
            .unwrap();
        assert!(email.is_match("HomeEmailAddress"));
        assert!(email.is_match("EMAIL"));
        assert!(!email.is_match("Phone"));
    }

    #[test]
    fn first_listed_match_wins_for_overlapping_field_names() {
        let first_match = |field: &str| {
            patterns_for("Patient")
                .iter()
                .find(|rule| rule.is_match(field))
                .map(|rule| rule.target_path)
        };
        assert_eq!(
            first_match("HomeEmailAddress"),
            Some("Patient.telecom[system='email']")
        );
        assert_eq!(first_match("Address"), Some("Patient.address.line[0]"));
        assert_eq!(
            first_match("WorkPhone"),
            Some("Patient.telecom[system='phone'][use='work']")
        );
    }

    #[test]
    fn unknown_resource_type_has_no_rules() {
        assert!(patterns_for("Observation").is_empty());
        assert!(patterns_for("patient").is_empty());
    }
}
