#![deny(unsafe_code)]

//! Shallow checks on mapped resources and mapping configurations.
//!
//! [`validate_resource`] confirms a resource serializes and carries the
//! elements its registry definition marks as required. It is not profile
//! conformance. [`suggest_improvements`] reviews a configuration against the
//! per-resource checklist of target paths a mapping is expected to cover.

use fhirmap_model::{MappingConfiguration, MappingSuggestion, Resource, ValidationResult};
use fhirmap_standards::ResourceRegistry;
use tracing::debug;

/// Validates a mapped resource against the registry's required elements.
///
/// Resource types without a registry definition are only checked for
/// serialization.
pub fn validate_resource(resource: &Resource, registry: &ResourceRegistry) -> ValidationResult {
    let mut result = ValidationResult::new();
    let resource_type = resource.resource_type();

    if let Err(err) = serde_json::to_string(resource) {
        result.push_error(format!("Resource serialization failed: {err}"), None);
        return result;
    }

    let Some(definition) = registry.get(resource_type) else {
        debug!(resource_type, "no required elements registered");
        return result;
    };
    for required in definition.required {
        if !resource.has_element(required.element) {
            result.push_error(
                required.message,
                Some(format!("{resource_type}.{}", required.element)),
            );
        }
    }
    debug!(
        resource_type,
        errors = result.error_count(),
        "validated resource"
    );
    result
}

/// Checklist targets the configuration does not map, most severe first.
///
/// A target counts as covered only when some field mapping writes to exactly
/// that path.
pub fn suggest_improvements(
    configuration: &MappingConfiguration,
    registry: &ResourceRegistry,
) -> Vec<MappingSuggestion> {
    let Some(definition) = registry.get(&configuration.resource_type) else {
        return Vec::new();
    };
    let mut suggestions: Vec<MappingSuggestion> = definition
        .checklist
        .iter()
        .filter(|item| !configuration.maps_target(item.target_path))
        .map(|item| MappingSuggestion {
            severity: item.severity,
            message: item.message.to_string(),
            target_path: item.target_path.to_string(),
            suggested_source_fields: item
                .suggested_source_fields
                .iter()
                .map(|field| (*field).to_string())
                .collect(),
        })
        .collect();
    suggestions.sort_by_key(|suggestion| suggestion.severity);
    suggestions
}
