//! Mapping engine.
//!
//! Applies a mapping configuration to a source record, one field mapping at
//! a time. Field-level problems never abort the resource: each field mapping
//! yields a [`FieldStatus`] and the engine moves on. Only structural
//! failures (no configuration, unknown resource type) are returned as errors.

use std::sync::Arc;

use fhirmap_model::{
    EngineOptions, FieldMapping, FieldOutcome, FieldStatus, MappingConfiguration, MappingError,
    MappingReport, Resource, Result, SourceRecord, redact_value,
};
use fhirmap_standards::{ElementDefinition, ResourceDefinition, ResourceRegistry};
use fhirmap_transform::{coerce, transform_value};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::path::TargetPath;
use crate::store::ConfigurationStore;

#[derive(Debug)]
pub struct MappingEngine {
    options: EngineOptions,
    registry: ResourceRegistry,
    store: ConfigurationStore,
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingEngine {
    /// An engine with default options and the seeded resource registry.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self::with_registry(options, ResourceRegistry::with_defaults())
    }

    pub fn with_registry(options: EngineOptions, registry: ResourceRegistry) -> Self {
        Self {
            options,
            registry,
            store: ConfigurationStore::new(options.path_policy),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    /// Registers a configuration; see [`ConfigurationStore::register`].
    pub fn register(
        &self,
        configuration: MappingConfiguration,
    ) -> Result<Option<Arc<MappingConfiguration>>> {
        self.store.register(configuration)
    }

    pub fn is_configured(&self, resource_type: &str) -> bool {
        self.store.contains(resource_type)
    }

    /// Maps a record with the configuration registered for `resource_type`.
    pub fn map_to_fhir(
        &self,
        record: &SourceRecord,
        resource_type: &str,
    ) -> Result<MappingReport> {
        let configuration = self
            .store
            .get(resource_type)
            .ok_or_else(|| MappingError::configuration_not_found(resource_type))?;
        self.apply(record, &configuration)
    }

    /// Maps a record with a configuration that need not be registered.
    pub fn apply(
        &self,
        record: &SourceRecord,
        configuration: &MappingConfiguration,
    ) -> Result<MappingReport> {
        let definition = self.registry.definition(&configuration.resource_type)?;
        let mut resource = definition.instantiate();
        if let Some(profile) = configuration.profile.as_deref()
            && !profile.is_empty()
        {
            resource.set_profile(profile);
        }

        let mut outcomes = Vec::with_capacity(configuration.field_mappings.len());
        for mapping in &configuration.field_mappings {
            let status = apply_field(&mut resource, definition, record, mapping);
            match &status {
                FieldStatus::SkippedCoercion { reason } | FieldStatus::Failed { reason } => {
                    warn!(
                        source_field = %mapping.source_field,
                        target = %mapping.target_fhir_path,
                        reason = %reason,
                        "field mapping not applied"
                    );
                }
                other => debug!(
                    source_field = %mapping.source_field,
                    target = %mapping.target_fhir_path,
                    status = other.label(),
                    "field mapping processed"
                ),
            }
            outcomes.push(FieldOutcome {
                source_field: mapping.source_field.clone(),
                target_fhir_path: mapping.target_fhir_path.clone(),
                status,
            });
        }

        let report = MappingReport { resource, outcomes };
        debug!(
            resource_type = %configuration.resource_type,
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "mapping complete"
        );
        Ok(report)
    }
}

fn apply_field(
    resource: &mut Resource,
    definition: &ResourceDefinition,
    record: &SourceRecord,
    mapping: &FieldMapping,
) -> FieldStatus {
    let Some(raw) = record.get(&mapping.source_field) else {
        return FieldStatus::SkippedMissing;
    };
    if raw.is_null() && !mapping.allow_null {
        return FieldStatus::SkippedNull;
    }

    let path = match TargetPath::parse(&mapping.target_fhir_path) {
        Ok(path) => path,
        Err(err) => {
            return FieldStatus::SkippedUnsupportedPath {
                reason: err.to_string(),
            };
        }
    };
    if let Err(err) = path.ensure_resource_type(definition.resource_type) {
        return FieldStatus::Failed {
            reason: err.to_string(),
        };
    }
    let Some(element) = definition.element(&path.element_path()) else {
        return FieldStatus::SkippedUnsupportedPath {
            reason: format!(
                "{} has no element {}",
                definition.resource_type,
                path.element_path()
            ),
        };
    };
    let container = match path.container {
        Some(name) => match definition.element(name) {
            Some(container) if !container.is_primitive() => Some(container),
            _ => {
                return FieldStatus::SkippedUnsupportedPath {
                    reason: format!(
                        "{}.{name} is not a complex element",
                        definition.resource_type
                    ),
                };
            }
        },
        None => None,
    };

    let transformed = transform_value(raw, mapping);
    let raw_text = raw.to_string();
    debug!(
        source_field = %mapping.source_field,
        value = redact_value(&raw_text),
        "transformed source value"
    );
    if transformed.is_null() {
        clear_element(resource, &path);
        return FieldStatus::Applied;
    }
    let value = match coerce(&transformed, element) {
        Ok(value) => value,
        Err(err) => {
            return FieldStatus::SkippedCoercion {
                reason: err.to_string(),
            };
        }
    };

    match write_element(resource, &path, container, element, value) {
        Ok(()) => FieldStatus::Applied,
        Err(reason) => FieldStatus::Failed { reason },
    }
}

/// Writes a coerced value, creating a missing container on the way. A
/// repeating container is populated through its first entry.
fn write_element(
    resource: &mut Resource,
    path: &TargetPath<'_>,
    container: Option<&ElementDefinition>,
    element: &ElementDefinition,
    value: Value,
) -> std::result::Result<(), String> {
    let Some(container) = container else {
        let slot = resource
            .get_mut(path.property)
            .filter(|current| !current.is_null());
        match slot {
            Some(current) => assign(current, element, value),
            None => resource.set(path.property, initial_value(element, value)),
        }
        return Ok(());
    };

    if resource
        .get(container.name())
        .is_none_or(Value::is_null)
    {
        let empty = Value::Object(Map::new());
        let initial = if container.repeating {
            Value::Array(vec![empty])
        } else {
            empty
        };
        resource.set(container.name(), initial);
    }
    let target = resource
        .get_mut(container.name())
        .and_then(container_object)
        .ok_or_else(|| format!("{} does not hold an element", container.path))?;
    match target.get_mut(path.property).filter(|current| !current.is_null()) {
        Some(current) => assign(current, element, value),
        None => {
            target.insert(path.property.to_string(), initial_value(element, value));
        }
    }
    Ok(())
}

/// Object of a singular container, or the first entry of a repeating one.
fn container_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => {
            if items.is_empty() {
                items.push(Value::Object(Map::new()));
            }
            items.first_mut().and_then(Value::as_object_mut)
        }
        _ => None,
    }
}

fn initial_value(element: &ElementDefinition, value: Value) -> Value {
    if element.repeating {
        Value::Array(vec![value])
    } else {
        value
    }
}

/// Repeating elements accumulate values, singular ones are overwritten.
fn assign(current: &mut Value, element: &ElementDefinition, value: Value) {
    match current {
        Value::Array(items) if element.repeating => items.push(value),
        _ => *current = initial_value(element, value),
    }
}

/// A null written with `allow_null` clears the target element.
fn clear_element(resource: &mut Resource, path: &TargetPath<'_>) {
    match path.container {
        None => {
            resource.remove(path.property);
        }
        Some(container) => {
            if let Some(target) = resource.get_mut(container).and_then(container_object) {
                target.shift_remove(path.property);
            }
        }
    }
}
