//! Mapper source generation.
//!
//! A generated mapper is a small Rust module that embeds its configuration
//! as a raw string constant and maps records through a [`MappingEngine`]
//! built from it. Because the configuration travels inside the source, it
//! can be recovered from a generated file with [`parse_mapper_source`].
//!
//! [`MappingEngine`]: crate::MappingEngine

use fhirmap_model::{MappingConfiguration, MappingError, Result};

/// Opens the embedded configuration; always at the start of a line.
const CONFIGURATION_MARKER: &str = "pub const CONFIGURATION: &str = r";

/// Renders mapper source for `configuration`.
pub fn generate_mapper_source(configuration: &MappingConfiguration) -> Result<String> {
    let json = configuration.to_json()?;
    let hashes = "#".repeat(raw_string_hashes(&json));
    let type_name = type_identifier(&configuration.resource_type);
    let method = format!("to_fhir_{}", snake_case(&type_name));

    Ok(format!(
        r#"//! Generated mapper for {type_name} resources.
//!
//! Regenerate this file from its configuration instead of editing it.

use anyhow::Result;
use fhirmap_map::MappingEngine;
use fhirmap_model::{{MappingConfiguration, MappingReport, SourceRecord}};

pub const RESOURCE_TYPE: &str = {resource_literal};

{marker}{hashes}"{json}"{hashes};

pub struct {type_name}Mapper {{
    engine: MappingEngine,
}}

impl {type_name}Mapper {{
    pub fn new() -> Result<Self> {{
        let engine = MappingEngine::new();
        engine.register(MappingConfiguration::from_json(CONFIGURATION)?)?;
        Ok(Self {{ engine }})
    }}

    pub fn {method}(&self, source: &SourceRecord) -> Result<MappingReport> {{
        Ok(self.engine.map_to_fhir(source, RESOURCE_TYPE)?)
    }}
}}
"#,
        resource_literal = format_args!("{:?}", configuration.resource_type),
        marker = CONFIGURATION_MARKER,
    ))
}

/// Recovers the configuration embedded in generated mapper source.
pub fn parse_mapper_source(source: &str) -> Result<MappingConfiguration> {
    let start = source
        .match_indices(CONFIGURATION_MARKER)
        .map(|(index, _)| index)
        .find(|&index| index == 0 || source[..index].ends_with('\n'))
        .ok_or(MappingError::MissingEmbeddedConfiguration)?;
    let rest = &source[start + CONFIGURATION_MARKER.len()..];
    let hashes = rest.chars().take_while(|&c| c == '#').count();
    let body = rest[hashes..]
        .strip_prefix('"')
        .ok_or(MappingError::MissingEmbeddedConfiguration)?;
    let terminator = format!("\"{}", "#".repeat(hashes));
    let end = body
        .find(&terminator)
        .ok_or(MappingError::MissingEmbeddedConfiguration)?;
    MappingConfiguration::from_json(&body[..end])
}

/// Smallest hash count whose closing delimiter does not occur in `text`.
fn raw_string_hashes(text: &str) -> usize {
    let mut count = 1;
    while text.contains(&format!("\"{}", "#".repeat(count))) {
        count += 1;
    }
    count
}

/// Alphanumeric part of a resource type, usable as a Rust type name prefix.
fn type_identifier(resource_type: &str) -> String {
    let name: String = resource_type
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    match name.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => name,
        _ => format!("Resource{name}"),
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use fhirmap_model::FieldMapping;

    use super::*;

    #[test]
    fn identifiers_from_resource_types() {
        assert_eq!(type_identifier("Patient"), "Patient");
        assert_eq!(type_identifier("Medication-Request"), "MedicationRequest");
        assert_eq!(type_identifier("1Thing"), "Resource1Thing");
        assert_eq!(snake_case("MedicationRequest"), "medication_request");
        assert_eq!(snake_case("Patient"), "patient");
    }

    #[test]
    fn hashes_avoid_embedded_delimiters() {
        assert_eq!(raw_string_hashes(r#"{"a": "b"}"#), 1);
        assert_eq!(raw_string_hashes(r##"{"a": "b"#"}"##), 2);
    }

    #[test]
    fn embedded_configuration_survives_awkward_text() {
        let config = MappingConfiguration::new("Patient").with_field(FieldMapping::new(
            "Note\"#",
            "Patient.gender",
            "code",
        ));
        let source = generate_mapper_source(&config).unwrap();
        assert!(source.contains("pub struct PatientMapper"));
        assert!(source.contains("pub fn to_fhir_patient("));
        assert_eq!(parse_mapper_source(&source).unwrap(), config);
    }

    #[test]
    fn resource_type_cannot_break_out_of_the_header_comment() {
        let config = MappingConfiguration::new(
            "Patient\npub const CONFIGURATION: &str = r#\"{}\"#;",
        );
        let source = generate_mapper_source(&config).unwrap();
        let header = source.lines().next().unwrap();
        assert!(header.starts_with("//! Generated mapper for Patient"));
        assert_eq!(
            source
                .lines()
                .filter(|line| line.starts_with(CONFIGURATION_MARKER))
                .count(),
            1
        );
        assert_eq!(parse_mapper_source(&source).unwrap(), config);
    }

    #[test]
    fn marker_inside_a_comment_is_ignored() {
        let source = "// pub const CONFIGURATION: &str = r#\"{}\"#;\npub struct PatientMapper;";
        assert!(matches!(
            parse_mapper_source(source).unwrap_err(),
            MappingError::MissingEmbeddedConfiguration
        ));
    }

    #[test]
    fn source_without_configuration_is_rejected() {
        let err = parse_mapper_source("pub struct PatientMapper;").unwrap_err();
        assert!(matches!(err, MappingError::MissingEmbeddedConfiguration));
    }
}
