//! Field analysis.
//!
//! Proposes FHIR targets for the fields of a sample record by matching field
//! names against the pattern catalog, and value mappings by running the
//! value-normalization rules registered for the resource type.

use fhirmap_model::{
    DiscoveryThresholds, FhirDataType, PotentialMapping, SourceRecord, UNKNOWN_TARGET,
    ValueMappingCandidate,
};
use fhirmap_standards::{patterns_for, value_rules_for};
use indexmap::IndexMap;
use tracing::debug;

/// Value mapping candidates per source field, in record order.
pub type ValueHints = IndexMap<String, Vec<ValueMappingCandidate>>;

/// Source/target type pairs that carry over without conversion.
const EQUIVALENT_TYPES: &[(&str, &str)] = &[
    ("String", "string"),
    ("Integer", "integer"),
    ("Boolean", "boolean"),
];

/// Whether a source runtime type needs converting to reach a target type.
pub fn transformation_needed(source_type: &str, target_type: &str) -> bool {
    if source_type == target_type {
        return false;
    }
    !EQUIVALENT_TYPES
        .iter()
        .any(|&(source, target)| source == source_type && target == target_type)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAnalyzer {
    thresholds: DiscoveryThresholds,
}

impl FieldAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: DiscoveryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &DiscoveryThresholds {
        &self.thresholds
    }

    /// Candidate targets for every non-null field, in record order.
    ///
    /// Each matching rule yields one candidate, highest confidence first
    /// (ties keep catalog order). A field no rule matches yields a single
    /// `Unknown` candidate so it still surfaces for review.
    pub fn analyze_object(
        &self,
        record: &SourceRecord,
        resource_type: &str,
    ) -> Vec<PotentialMapping> {
        let rules = patterns_for(resource_type);
        let mut mappings = Vec::new();

        for (field, value) in record.fields() {
            if value.is_null() {
                continue;
            }
            let source_value = value.to_string();
            let source_type = value.type_name();

            let mut matches: Vec<_> = rules.iter().filter(|rule| rule.is_match(field)).collect();
            matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

            if matches.is_empty() {
                debug!(field, resource_type, "no pattern matched");
                mappings.push(PotentialMapping {
                    source_property: field.to_string(),
                    source_value,
                    source_type: source_type.to_string(),
                    target_fhir_path: UNKNOWN_TARGET.to_string(),
                    target_fhir_type: FhirDataType::unknown(),
                    confidence: self.thresholds.unknown_confidence,
                    transformation_needed: true,
                });
                continue;
            }

            debug!(field, resource_type, candidates = matches.len(), "patterns matched");
            for rule in matches {
                mappings.push(PotentialMapping {
                    source_property: field.to_string(),
                    source_value: source_value.clone(),
                    source_type: source_type.to_string(),
                    target_fhir_path: rule.target_path.to_string(),
                    target_fhir_type: rule.data_type(),
                    confidence: rule.confidence,
                    transformation_needed: transformation_needed(
                        source_type,
                        rule.target_data_type,
                    ),
                });
            }
        }
        mappings
    }

    /// Value mapping candidates from the rules registered for `resource_type`.
    ///
    /// Null and empty values are ignored.
    pub fn analyze_values(&self, record: &SourceRecord, resource_type: &str) -> ValueHints {
        let mut hints = ValueHints::new();
        for (field, value) in record.fields() {
            if value.is_null() {
                continue;
            }
            let text = value.to_string();
            if text.is_empty() {
                continue;
            }
            let candidates: Vec<_> = value_rules_for(resource_type)
                .filter(|rule| rule.applies_to(field))
                .filter_map(|rule| (rule.normalize)(&text))
                .collect();
            if !candidates.is_empty() {
                debug!(field, resource_type, count = candidates.len(), "value mappings proposed");
                hints.insert(field.to_string(), candidates);
            }
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalence_table() {
        assert!(!transformation_needed("String", "string"));
        assert!(!transformation_needed("Integer", "integer"));
        assert!(!transformation_needed("Boolean", "boolean"));
        assert!(!transformation_needed("Identifier", "Identifier"));
        assert!(transformation_needed("String", "date"));
        assert!(transformation_needed("String", "code"));
        assert!(transformation_needed("Integer", "string"));
    }
}
