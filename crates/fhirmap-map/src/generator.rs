//! Configuration generation from analysis results.

use fhirmap_model::{
    DiscoveryThresholds, FhirDataType, FieldMapping, MappingConfiguration, PotentialMapping,
    SourceRecord,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::analyzer::{FieldAnalyzer, ValueHints};

const US_SSN_SYSTEM: &str = "http://hl7.org/fhir/sid/us-ssn";
const HOSPITAL_MRN_SYSTEM: &str = "http://hospital.smarthealthit.org";

/// `system` and `use` read off a target path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAnnotations {
    pub system: Option<String>,
    pub r#use: Option<String>,
}

/// Infers `system`/`use` from the text of a target path.
///
/// This is a substring convention shared with hand-authored configurations:
/// Identifier paths mentioning `us-ssn` or `hospital` get the matching
/// identifier system, ContactPoint paths mentioning `phone` or `email` get
/// that contact system, and a `[use='home'|'work'|'mobile']` qualifier sets
/// the use.
pub fn infer_path_annotations(path: &str, data_type: &FhirDataType) -> PathAnnotations {
    let mut annotations = PathAnnotations::default();
    match data_type {
        FhirDataType::Identifier => {
            if path.contains("us-ssn") {
                annotations.system = Some(US_SSN_SYSTEM.to_string());
            } else if path.contains("hospital") {
                annotations.system = Some(HOSPITAL_MRN_SYSTEM.to_string());
            }
        }
        FhirDataType::ContactPoint => {
            if path.contains("phone") {
                annotations.system = Some("phone".to_string());
            } else if path.contains("email") {
                annotations.system = Some("email".to_string());
            }
            annotations.r#use = ["home", "work", "mobile"]
                .into_iter()
                .find(|use_code| path.contains(&format!("[use='{use_code}']")))
                .map(str::to_string);
        }
        _ => {}
    }
    annotations
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationGenerator {
    analyzer: FieldAnalyzer,
}

impl ConfigurationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: DiscoveryThresholds) -> Self {
        self.analyzer = self.analyzer.with_thresholds(thresholds);
        self
    }

    pub fn analyzer(&self) -> &FieldAnalyzer {
        &self.analyzer
    }

    /// Analyzes a sample record and builds a configuration from the result.
    pub fn generate_configuration(
        &self,
        record: &SourceRecord,
        resource_type: &str,
        profile: Option<&str>,
    ) -> MappingConfiguration {
        let mappings = self.analyzer.analyze_object(record, resource_type);
        let value_hints = self.analyzer.analyze_values(record, resource_type);
        self.configuration_from_mappings(resource_type, &mappings, &value_hints, profile)
    }

    /// Builds a configuration from (possibly reviewed) candidate mappings.
    ///
    /// The best candidate per source field is kept, in first-occurrence
    /// order. Unknown targets below the noise cutoff are dropped.
    pub fn configuration_from_mappings(
        &self,
        resource_type: &str,
        mappings: &[PotentialMapping],
        value_hints: &ValueHints,
        profile: Option<&str>,
    ) -> MappingConfiguration {
        let mut best: IndexMap<&str, &PotentialMapping> = IndexMap::new();
        for candidate in mappings {
            best.entry(candidate.source_property.as_str())
                .and_modify(|current| {
                    if candidate.confidence > current.confidence {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }

        let noise_cutoff = self.analyzer.thresholds().noise_cutoff;
        let mut configuration = MappingConfiguration::new(resource_type);
        configuration.profile = profile.map(str::to_string);

        for (source, candidate) in best {
            if candidate.is_unknown() && candidate.confidence < noise_cutoff {
                debug!(field = source, "dropping unmatched field below noise cutoff");
                continue;
            }
            let annotations =
                infer_path_annotations(&candidate.target_fhir_path, &candidate.target_fhir_type);
            let mut field = FieldMapping::new(
                source,
                candidate.target_fhir_path.clone(),
                candidate.target_fhir_type.clone(),
            );
            field.system = annotations.system;
            field.r#use = annotations.r#use;
            if let Some(hints) = value_hints.get(source) {
                field.value_mappings = hints
                    .iter()
                    .map(|hint| hint.value_mapping.clone())
                    .collect();
            }
            configuration.push(field);
        }
        configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_follow_path_text() {
        let ssn = infer_path_annotations(
            "Patient.identifier[system='http://hl7.org/fhir/sid/us-ssn']",
            &FhirDataType::Identifier,
        );
        assert_eq!(ssn.system.as_deref(), Some(US_SSN_SYSTEM));
        assert_eq!(ssn.r#use, None);

        let work = infer_path_annotations(
            "Patient.telecom[system='phone'][use='work']",
            &FhirDataType::ContactPoint,
        );
        assert_eq!(work.system.as_deref(), Some("phone"));
        assert_eq!(work.r#use.as_deref(), Some("work"));

        let email =
            infer_path_annotations("Patient.telecom[system='email']", &FhirDataType::ContactPoint);
        assert_eq!(email.system.as_deref(), Some("email"));
        assert_eq!(email.r#use, None);
    }

    #[test]
    fn annotations_are_gated_by_data_type() {
        let plain = infer_path_annotations(
            "Patient.identifier[system='http://hl7.org/fhir/sid/us-ssn']",
            &FhirDataType::String,
        );
        assert_eq!(plain, PathAnnotations::default());
        assert_eq!(
            infer_path_annotations("Patient.address.postalCode", &FhirDataType::String),
            PathAnnotations::default()
        );
    }
}
