use fhirmap_model::{
    EngineOptions, FieldMapping, FieldOutcome, FieldStatus, IssueSeverity, MappingConfiguration,
    MappingReport, PathPolicy, Resource, ValidationResult, ValueMapping,
};
use proptest::prelude::*;

fn data_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("string".to_string()),
        Just("date".to_string()),
        Just("dateTime".to_string()),
        Just("CodeableConcept".to_string()),
        Just("ContactPoint".to_string()),
        "[A-Z][a-zA-Z]{0,10}",
    ]
}

fn value_mapping() -> impl Strategy<Value = ValueMapping> {
    (
        "[a-zA-Z]{0,6}",
        "[a-z]{1,8}",
        proptest::option::of("http://[a-z]{1,8}\\.org/[a-z]{1,8}"),
    )
        .prop_map(|(source, target, system)| ValueMapping {
            source_value: source,
            target_value: target,
            target_system: system,
        })
}

fn field_mapping() -> impl Strategy<Value = FieldMapping> {
    (
        "[A-Za-z_][A-Za-z0-9_]{0,12}",
        "Patient\\.[a-z]{1,8}(\\.[a-z]{1,8})?",
        data_type(),
        proptest::option::of("[a-z]{1,6}"),
        proptest::option::of("home|work|mobile"),
        any::<bool>(),
        proptest::collection::vec(value_mapping(), 0..3),
    )
        .prop_map(
            |(source, path, data_type, system, use_code, allow_null, value_mappings)| {
                FieldMapping {
                    source_field: source,
                    target_fhir_path: path,
                    target_data_type: data_type.into(),
                    system,
                    r#use: use_code,
                    allow_null,
                    value_mappings,
                }
            },
        )
}

proptest! {
    #[test]
    fn configuration_survives_save_and_load(
        profile in proptest::option::of("http://[a-z]{1,10}\\.org/[A-Za-z-]{1,16}"),
        fields in proptest::collection::vec(field_mapping(), 0..6),
    ) {
        let config = MappingConfiguration {
            resource_type: "Patient".to_string(),
            profile,
            field_mappings: fields,
        };
        let json = config.to_json().unwrap();
        let loaded = MappingConfiguration::from_json(&json).unwrap();
        prop_assert_eq!(loaded, config);
    }
}

#[test]
fn hand_authored_document_loads_with_defaults() {
    let json = r#"{
        "resourceType": "Condition",
        "fieldMappings": [
            {"sourceField": "Icd", "targetFhirPath": "Condition.code", "targetDataType": "CodeableConcept"}
        ]
    }"#;
    let config = MappingConfiguration::from_json(json).unwrap();
    assert_eq!(config.resource_type, "Condition");
    assert!(config.profile.is_none());
    let mapping = &config.field_mappings[0];
    assert!(!mapping.allow_null);
    assert!(mapping.value_mappings.is_empty());
    assert!(config.maps_target("Condition.code"));
}

#[test]
fn report_counts_outcomes_by_kind() {
    let outcome = |field: &str, status| FieldOutcome {
        source_field: field.to_string(),
        target_fhir_path: format!("Patient.{}", field.to_lowercase()),
        status,
    };
    let report = MappingReport {
        resource: Resource::new("Patient"),
        outcomes: vec![
            outcome("Gender", FieldStatus::Applied),
            outcome("NotPresent", FieldStatus::SkippedMissing),
            outcome("Middle", FieldStatus::SkippedNull),
            outcome(
                "Active",
                FieldStatus::SkippedCoercion {
                    reason: "expected boolean".to_string(),
                },
            ),
            outcome(
                "Other",
                FieldStatus::Failed {
                    reason: "wrong resource type".to_string(),
                },
            ),
        ],
    };
    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.skipped_count(), 3);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(
        report.outcome_for("NotPresent"),
        Some(&FieldStatus::SkippedMissing)
    );
    assert_eq!(
        report.outcome_for("Active").and_then(FieldStatus::reason),
        Some("expected boolean")
    );
}

#[test]
fn field_outcome_serializes_status_inline() {
    let outcome = FieldOutcome {
        source_field: "Active".to_string(),
        target_fhir_path: "Patient.active".to_string(),
        status: FieldStatus::SkippedCoercion {
            reason: "not a boolean".to_string(),
        },
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "sourceField": "Active",
            "targetFhirPath": "Patient.active",
            "status": "skippedCoercion",
            "reason": "not a boolean"
        })
    );
}

#[test]
fn validation_result_tracks_errors() {
    let mut result = ValidationResult::new();
    assert!(result.is_valid);
    result.push_warning("birth date missing", Some("Patient.birthDate".to_string()));
    assert!(result.is_valid);
    result.push_error("gender missing", Some("Patient.gender".to_string()));
    assert!(!result.is_valid);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.warning_count(), 1);
    assert!(IssueSeverity::Error < IssueSeverity::Warning);
}

#[test]
fn engine_options_default_to_lenient() {
    let options = EngineOptions::default();
    assert_eq!(options.path_policy, PathPolicy::Lenient);
    assert!((options.thresholds.unknown_confidence - 0.1).abs() < f64::EPSILON);
    assert!((options.thresholds.noise_cutoff - 0.3).abs() < f64::EPSILON);
    assert_eq!(EngineOptions::strict().path_policy, PathPolicy::Strict);
    let json = serde_json::to_string(&EngineOptions::strict()).unwrap();
    assert!(json.contains("\"pathPolicy\":\"strict\""));
}
