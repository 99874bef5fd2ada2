use std::fs;

use fhirmap_map::{ConfigurationRepository, StoredMappingConfiguration};
use fhirmap_model::{FieldMapping, MappingConfiguration, ValueMapping};
use tempfile::TempDir;

fn sample_config(resource_type: &str) -> MappingConfiguration {
    MappingConfiguration::new(resource_type)
        .with_profile(format!("http://example.org/StructureDefinition/{resource_type}"))
        .with_field(FieldMapping::new(
            "LastName",
            format!("{resource_type}.name.family"),
            "string",
        ))
        .with_field(
            FieldMapping::new("Sex", format!("{resource_type}.gender"), "code")
                .with_value_mapping(ValueMapping::new("F", "female")),
        )
}

#[test]
fn repository_save_and_load() {
    let dir = TempDir::new().unwrap();
    let repo = ConfigurationRepository::new(dir.path()).unwrap();

    let config = sample_config("Patient");
    let path = repo.save(&config).unwrap();
    assert!(path.ends_with("Patient.json"));
    assert!(repo.exists("Patient"));

    let loaded = repo.load("Patient").unwrap().expect("configuration stored");
    assert_eq!(loaded, config);

    let stored = repo.load_stored("Patient").unwrap().unwrap();
    assert_eq!(stored.version, "1.0");
    assert!(stored.saved_at.is_some());
}

#[test]
fn stored_document_is_flat() {
    let dir = TempDir::new().unwrap();
    let repo = ConfigurationRepository::new(dir.path()).unwrap();
    let stored =
        StoredMappingConfiguration::new(sample_config("Patient")).with_description("intake feed");
    let path = repo.save_stored(&stored).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["resourceType"], "Patient");
    assert_eq!(json["fieldMappings"][1]["valueMappings"][0]["targetValue"], "female");
    assert_eq!(json["description"], "intake feed");
    assert!(json["savedAt"].is_string());
}

#[test]
fn missing_configuration_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let repo = ConfigurationRepository::new(dir.path().join("nested")).unwrap();
    assert!(repo.base_dir().is_dir());
    assert!(repo.load("Patient").unwrap().is_none());
    assert!(!repo.delete("Patient").unwrap());
}

#[test]
fn list_and_load_all_skip_unreadable_files() {
    let dir = TempDir::new().unwrap();
    let repo = ConfigurationRepository::new(dir.path()).unwrap();
    repo.save(&sample_config("Patient")).unwrap();
    repo.save(&sample_config("Condition")).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let all = repo.load_all().unwrap();
    assert_eq!(
        all.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Condition", "Patient"]
    );

    let listed = repo.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].resource_type, "Condition");
    assert_eq!(listed[1].field_count, 2);
    assert!(listed[1].saved_at.is_some());
}

#[test]
fn delete_removes_file() {
    let dir = TempDir::new().unwrap();
    let repo = ConfigurationRepository::new(dir.path()).unwrap();
    repo.save(&sample_config("Patient")).unwrap();
    assert!(repo.delete("Patient").unwrap());
    assert!(!repo.exists("Patient"));
    assert!(repo.list().unwrap().is_empty());
}
