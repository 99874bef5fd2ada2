use fhirmap_model::{IssueSeverity, MappingError};
use fhirmap_standards::{
    ADMINISTRATIVE_GENDER_CODES, ElementDefinition, ResourceDefinition, ResourceRegistry,
    default_registry,
};

#[test]
fn seeded_registry_builds_empty_resources() {
    let registry = default_registry();
    for resource_type in ["Patient", "Condition", "Observation"] {
        let resource = registry.instantiate(resource_type).expect("registered type");
        assert_eq!(resource.resource_type(), resource_type);
        assert!(resource.elements().is_empty());
    }
}

#[test]
fn unknown_resource_type_is_an_error() {
    let err = ResourceRegistry::with_defaults()
        .instantiate("Spaceship")
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnknownResourceType { ref resource_type } if resource_type == "Spaceship"
    ));
}

#[test]
fn patient_gender_is_bound_to_administrative_gender() {
    let patient = default_registry().get("Patient").unwrap();
    let gender = patient.element("gender").unwrap();
    assert_eq!(gender.type_name, "code");
    assert!(gender.is_primitive());
    assert_eq!(gender.binding, Some(ADMINISTRATIVE_GENDER_CODES));

    let given = patient.element("name.given").unwrap();
    assert!(given.repeating);
    assert_eq!(given.name(), "given");
    assert!(!patient.element("name").unwrap().is_primitive());
}

#[test]
fn checklist_ranks_gender_as_error_with_examples() {
    let patient = default_registry().get("Patient").unwrap();
    let gender = patient
        .checklist
        .iter()
        .find(|item| item.target_path == "Patient.gender")
        .unwrap();
    assert_eq!(gender.severity, IssueSeverity::Error);
    assert_eq!(gender.suggested_source_fields, ["Gender", "Sex"]);
}

#[test]
fn new_resource_types_are_added_by_registration() {
    static ELEMENTS: &[ElementDefinition] = &[ElementDefinition {
        path: "status",
        type_name: "code",
        repeating: false,
        binding: None,
    }];
    let mut registry = ResourceRegistry::new();
    assert!(!registry.contains("Encounter"));
    let previous = registry.register(ResourceDefinition {
        resource_type: "Encounter",
        elements: ELEMENTS,
        required: &[],
        checklist: &[],
    });
    assert!(previous.is_none());
    assert!(registry.contains("Encounter"));
    assert_eq!(registry.resource_types().collect::<Vec<_>>(), vec!["Encounter"]);
    assert_eq!(
        registry.instantiate("Encounter").unwrap().resource_type(),
        "Encounter"
    );
}
