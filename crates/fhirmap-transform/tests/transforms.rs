use chrono::NaiveDate;
use fhirmap_model::{FieldMapping, SourceValue, ValueMapping};
use fhirmap_standards::default_registry;
use fhirmap_transform::{TransformError, TransformedValue, coerce, transform_value};
use serde_json::json;

fn patient_element(path: &str) -> &'static fhirmap_standards::ElementDefinition {
    default_registry()
        .get("Patient")
        .and_then(|definition| definition.element(path))
        .expect("patient element")
}

#[test]
fn value_mapping_wins_over_datatype_dispatch() {
    let mapping = FieldMapping::new("Gender", "Patient.gender", "code").with_value_mapping(
        ValueMapping::new("M", "male").with_system("http://hl7.org/fhir/administrative-gender"),
    );
    assert_eq!(
        transform_value(&"m".into(), &mapping),
        TransformedValue::Text("male".to_string())
    );
    // no match: the code is stringified unchanged
    assert_eq!(
        transform_value(&"X".into(), &mapping),
        TransformedValue::Text("X".to_string())
    );
}

#[test]
fn codeable_concept_value_mapping_carries_code_and_system() {
    let mapping = FieldMapping::new("Status", "Condition.clinicalStatus", "CodeableConcept")
        .with_system("http://terminology.hl7.org/CodeSystem/condition-clinical")
        .with_value_mapping(ValueMapping::new("A", "active"));
    let transformed = transform_value(&"a".into(), &mapping);
    assert_eq!(
        transformed.complex_json(),
        Some(json!({
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "code": "active",
                "display": "a"
            }]
        }))
    );

    let unmapped = transform_value(&"Resolved".into(), &mapping);
    assert_eq!(
        unmapped.complex_json(),
        Some(json!({
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "display": "Resolved"
            }]
        }))
    );
}

#[test]
fn dates_normalize_or_pass_through() {
    let mapping = FieldMapping::new("DOB", "Patient.birthDate", "date");
    assert_eq!(
        transform_value(&"01/31/1970".into(), &mapping),
        TransformedValue::Text("1970-01-31".to_string())
    );
    let date = NaiveDate::from_ymd_opt(1970, 1, 31).unwrap();
    assert_eq!(
        transform_value(&SourceValue::from(date.and_hms_opt(8, 0, 0).unwrap()), &mapping),
        TransformedValue::Text("1970-01-31".to_string())
    );
    assert_eq!(
        transform_value(&"sometime in spring".into(), &mapping),
        TransformedValue::Original("sometime in spring".into())
    );
}

#[test]
fn unknown_datatype_passes_value_through() {
    let mapping = FieldMapping::new("Weight", "Patient.weight", "Quantity");
    assert_eq!(
        transform_value(&SourceValue::Decimal(71.5), &mapping),
        TransformedValue::Original(SourceValue::Decimal(71.5))
    );
}

#[test]
fn identifier_takes_system_from_mapping() {
    let mapping = FieldMapping::new("SSN", "Patient.identifier", "Identifier")
        .with_system("http://hl7.org/fhir/sid/us-ssn");
    let value = transform_value(&"123-45-6789".into(), &mapping);
    let coerced = coerce(&value, patient_element("identifier")).unwrap();
    assert_eq!(
        coerced,
        json!({"system": "http://hl7.org/fhir/sid/us-ssn", "value": "123-45-6789"})
    );
}

#[test]
fn gender_binding_rejects_unknown_codes() {
    let gender = patient_element("gender");
    assert_eq!(
        coerce(&TransformedValue::Text("female".to_string()), gender),
        Ok(json!("female"))
    );
    assert_eq!(
        coerce(&TransformedValue::Text("M".to_string()), gender),
        Err(TransformError::OutsideBinding { element: "gender" })
    );
}

#[test]
fn coercion_checks_primitive_formats() {
    let birth_date = patient_element("birthDate");
    assert_eq!(
        coerce(&TransformedValue::Text("1970-01-31".to_string()), birth_date),
        Ok(json!("1970-01-31"))
    );
    assert!(matches!(
        coerce(&TransformedValue::Original("spring".into()), birth_date),
        Err(TransformError::InvalidFormat { .. })
    ));

    let active = patient_element("active");
    assert_eq!(
        coerce(&TransformedValue::Text("True".to_string()), active),
        Ok(json!(true))
    );
    assert!(coerce(&TransformedValue::Original("yes".into()), active).is_err());

    let births = patient_element("multipleBirthInteger");
    assert_eq!(coerce(&TransformedValue::Integer(2), births), Ok(json!(2)));
    assert_eq!(
        coerce(&TransformedValue::Integer(i64::from(i32::MAX) + 1), births),
        Err(TransformError::OutOfRange {
            element: "multipleBirthInteger"
        })
    );
}

#[test]
fn complex_values_do_not_fit_primitive_elements() {
    let mapping = FieldMapping::new("Phone", "Patient.telecom", "ContactPoint").with_system("phone");
    let point = transform_value(&"555-0100".into(), &mapping);
    assert!(matches!(
        coerce(&point, patient_element("name.family")),
        Err(TransformError::Incompatible {
            from: "ContactPoint",
            ..
        })
    ));
    assert_eq!(
        coerce(&point, patient_element("telecom")),
        Ok(json!({"system": "phone", "value": "555-0100"}))
    );
    // containers are never assigned directly
    assert!(coerce(&TransformedValue::Text("Doe".to_string()), patient_element("name")).is_err());
}
