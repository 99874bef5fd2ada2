//! Configuration store.
//!
//! Registered configurations are keyed by resource type. Registration
//! replaces the whole entry (last writer wins, no merging) and hands back the
//! configuration it replaced, so callers can tell a first registration from
//! a reconfiguration.

use std::collections::HashMap;
use std::sync::Arc;

use fhirmap_model::{MappingConfiguration, MappingError, PathPolicy, Result, UNKNOWN_TARGET};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::path::TargetPath;

#[derive(Debug, Default)]
pub struct ConfigurationStore {
    policy: PathPolicy,
    configurations: RwLock<HashMap<String, Arc<MappingConfiguration>>>,
}

impl ConfigurationStore {
    pub fn new(policy: PathPolicy) -> Self {
        Self {
            policy,
            configurations: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// Validates and registers a configuration under its resource type.
    ///
    /// Under [`PathPolicy::Strict`] unsupported or mismatched target paths
    /// and duplicate source fields are rejected; under
    /// [`PathPolicy::Lenient`] they are logged and the configuration is
    /// accepted as is.
    pub fn register(
        &self,
        configuration: MappingConfiguration,
    ) -> Result<Option<Arc<MappingConfiguration>>> {
        check_configuration(&configuration, self.policy)?;
        let resource_type = configuration.resource_type.clone();
        let previous = self
            .configurations
            .write()
            .insert(resource_type.clone(), Arc::new(configuration));
        info!(
            resource_type = %resource_type,
            replaced = previous.is_some(),
            "registered mapping configuration"
        );
        Ok(previous)
    }

    pub fn get(&self, resource_type: &str) -> Option<Arc<MappingConfiguration>> {
        self.configurations.read().get(resource_type).cloned()
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.configurations.read().contains_key(resource_type)
    }

    pub fn remove(&self, resource_type: &str) -> Option<Arc<MappingConfiguration>> {
        self.configurations.write().remove(resource_type)
    }

    /// Registered resource types, sorted.
    pub fn resource_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.configurations.read().keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.configurations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.read().is_empty()
    }

    /// Serialized form of a registered configuration.
    pub fn save_to_string(&self, resource_type: &str) -> Result<String> {
        self.get(resource_type)
            .ok_or_else(|| MappingError::configuration_not_found(resource_type))?
            .to_json()
    }

    /// Parses a serialized configuration and registers it.
    pub fn load_from_str(&self, json: &str) -> Result<Option<Arc<MappingConfiguration>>> {
        self.register(MappingConfiguration::from_json(json)?)
    }
}

/// Registration-time checks of target paths and source field uniqueness.
pub fn check_configuration(configuration: &MappingConfiguration, policy: PathPolicy) -> Result<()> {
    let resource_type = configuration.resource_type.as_str();
    for mapping in &configuration.field_mappings {
        let path = mapping.target_fhir_path.as_str();
        let checked =
            TargetPath::parse(path).and_then(|parsed| parsed.ensure_resource_type(resource_type));
        match (checked, policy) {
            (Ok(()), _) => {}
            (Err(err), PathPolicy::Strict) => return Err(err),
            (Err(err), PathPolicy::Lenient) => {
                // unmatched fields kept for review are expected to be skipped
                if path != UNKNOWN_TARGET {
                    warn!(
                        resource_type,
                        source_field = %mapping.source_field,
                        error = %err,
                        "field mapping will be skipped when applied"
                    );
                }
            }
        }
    }

    let duplicates = configuration.duplicate_source_fields();
    if let Some(field) = duplicates.first() {
        match policy {
            PathPolicy::Strict => {
                return Err(MappingError::DuplicateSourceField {
                    resource_type: resource_type.to_string(),
                    field: (*field).to_string(),
                });
            }
            PathPolicy::Lenient => {
                warn!(
                    resource_type,
                    fields = ?duplicates,
                    "source fields mapped more than once; the last mapping wins"
                );
            }
        }
    }
    Ok(())
}
