use fhirmap_map::{ConfigurationGenerator, MappingEngine};
use fhirmap_model::{FieldMapping, IssueSeverity, MappingConfiguration, Resource, SourceRecord};
use fhirmap_standards::{ResourceRegistry, default_registry};
use fhirmap_validate::{suggest_improvements, validate_resource};
use serde_json::json;

#[test]
fn complete_patient_is_valid() {
    let mut patient = Resource::new("Patient");
    patient.set("name", json!([{"family": "Doe"}]));
    patient.set("gender", json!("female"));
    let result = validate_resource(&patient, default_registry());
    assert!(result.is_valid);
    assert!(result.issues.is_empty());
}

#[test]
fn missing_required_elements_are_errors() {
    let mut patient = Resource::new("Patient");
    patient.set("name", json!([{}]));
    let result = validate_resource(&patient, default_registry());
    assert!(!result.is_valid);
    assert_eq!(result.error_count(), 2);
    let paths: Vec<_> = result
        .issues
        .iter()
        .filter_map(|issue| issue.path.as_deref())
        .collect();
    assert_eq!(paths, vec!["Patient.name", "Patient.gender"]);
    assert_eq!(result.issues[1].message, "Patient.gender is required");
}

#[test]
fn condition_requires_subject_and_code() {
    let mut condition = Resource::new("Condition");
    condition.set("code", json!({"coding": [{"display": "E11.9"}]}));
    let result = validate_resource(&condition, default_registry());
    assert!(!result.is_valid);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].path.as_deref(), Some("Condition.subject"));
}

#[test]
fn unregistered_types_only_need_to_serialize() {
    let result = validate_resource(&Resource::new("Widget"), &ResourceRegistry::new());
    assert!(result.is_valid);
}

#[test]
fn mapped_patient_validates() {
    let record = SourceRecord::new()
        .with_field("LastName", "Doe")
        .with_field("Gender", "F");
    let engine = MappingEngine::new();
    engine
        .register(ConfigurationGenerator::new().generate_configuration(&record, "Patient", None))
        .unwrap();
    let report = engine.map_to_fhir(&record, "Patient").unwrap();
    let result = validate_resource(&report.resource, engine.registry());
    assert!(result.is_valid, "{:?}", result.issues);
}

#[test]
fn missing_gender_is_suggested() {
    let config = MappingConfiguration::new("Patient")
        .with_field(FieldMapping::new("LastName", "Patient.name.family", "string"))
        .with_field(FieldMapping::new("FirstName", "Patient.name.given[0]", "string"))
        .with_field(FieldMapping::new("DOB", "Patient.birthDate", "date"));
    let suggestions = suggest_improvements(&config, default_registry());
    assert_eq!(suggestions.len(), 1);
    let gender = &suggestions[0];
    assert_eq!(gender.severity, IssueSeverity::Error);
    assert_eq!(gender.target_path, "Patient.gender");
    assert_eq!(gender.suggested_source_fields, vec!["Gender", "Sex"]);
}

#[test]
fn suggestions_rank_errors_before_warnings() {
    let config = MappingConfiguration::new("Patient");
    let suggestions = suggest_improvements(&config, default_registry());
    let severities: Vec<_> = suggestions.iter().map(|s| s.severity).collect();
    assert_eq!(
        severities,
        vec![
            IssueSeverity::Error,
            IssueSeverity::Error,
            IssueSeverity::Error,
            IssueSeverity::Warning,
        ]
    );
    assert_eq!(suggestions[3].target_path, "Patient.birthDate");

    let condition = suggest_improvements(&MappingConfiguration::new("Condition"), default_registry());
    assert_eq!(condition[0].target_path, "Condition.code");
    assert_eq!(condition[0].severity, IssueSeverity::Error);
    assert!(condition[1..].iter().all(|s| s.severity == IssueSeverity::Warning));
}

#[test]
fn unknown_resource_types_have_no_suggestions() {
    assert!(suggest_improvements(&MappingConfiguration::new("Widget"), default_registry()).is_empty());
}
