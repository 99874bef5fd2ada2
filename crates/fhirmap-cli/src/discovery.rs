//! Discovery service: the single entry point over analysis, generation,
//! mapping, persistence and review.
//!
//! The service memoizes one configuration per resource type. The first
//! [`DiscoveryService::map_to_fhir`] call for a type generates a
//! configuration from the record it is given and registers it; later calls
//! reuse it until another configuration is registered for the type.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use fhirmap_map::{
    ConfigurationGenerator, ConfigurationRepository, MappingEngine, ValueHints,
    generate_mapper_source,
};
use fhirmap_model::{
    EngineOptions, FieldOutcome, MappingConfiguration, MappingReport, MappingSuggestion,
    PotentialMapping, Resource, SourceRecord, ValidationResult,
};
use fhirmap_validate::{suggest_improvements, validate_resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, info_span};

/// Mapped resource with its validation and per-field outcomes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub resource: Resource,
    pub validation: ValidationResult,
    pub outcomes: Vec<FieldOutcome>,
}

/// Field analysis of one sample record, in the form `fhirmap analyze --json`
/// prints it.
///
/// A reviewer may drop or re-target candidates and edit the value mappings
/// before building a configuration from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub mappings: Vec<PotentialMapping>,
    #[serde(default)]
    pub value_mappings: ValueHints,
}

impl AnalysisReport {
    /// Parses an analysis document, or a bare array of candidate mappings.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        if value.is_array() {
            return Ok(Self {
                resource_type: None,
                mappings: serde_json::from_value(value)?,
                value_mappings: ValueHints::new(),
            });
        }
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug)]
pub struct DiscoveryService {
    generator: ConfigurationGenerator,
    engine: MappingEngine,
    repository: Option<ConfigurationRepository>,
}

impl Default for DiscoveryService {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryService {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            generator: ConfigurationGenerator::new().with_thresholds(options.thresholds),
            engine: MappingEngine::with_options(options),
            repository: None,
        }
    }

    /// Persists configurations through `repository`.
    #[must_use]
    pub fn with_repository(mut self, repository: ConfigurationRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn options(&self) -> &EngineOptions {
        self.engine.options()
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    pub fn repository(&self) -> Option<&ConfigurationRepository> {
        self.repository.as_ref()
    }

    pub fn discover_mappings(
        &self,
        record: &SourceRecord,
        resource_type: &str,
    ) -> Vec<PotentialMapping> {
        self.generator.analyzer().analyze_object(record, resource_type)
    }

    pub fn analyze_values(&self, record: &SourceRecord, resource_type: &str) -> ValueHints {
        self.generator.analyzer().analyze_values(record, resource_type)
    }

    /// Candidate mappings and value hints for `record`, as one document.
    pub fn analyze(&self, record: &SourceRecord, resource_type: &str) -> AnalysisReport {
        AnalysisReport {
            resource_type: Some(resource_type.to_string()),
            mappings: self.discover_mappings(record, resource_type),
            value_mappings: self.analyze_values(record, resource_type),
        }
    }

    pub fn generate_configuration(
        &self,
        record: &SourceRecord,
        resource_type: &str,
        profile: Option<&str>,
    ) -> MappingConfiguration {
        self.generator
            .generate_configuration(record, resource_type, profile)
    }

    /// Builds a configuration from reviewed candidate mappings.
    pub fn configuration_from_mappings(
        &self,
        resource_type: &str,
        mappings: &[PotentialMapping],
        value_hints: &ValueHints,
        profile: Option<&str>,
    ) -> MappingConfiguration {
        self.generator
            .configuration_from_mappings(resource_type, mappings, value_hints, profile)
    }

    /// Builds a configuration from a reviewed analysis document.
    ///
    /// `resource_type` overrides the type the document names; one of the two
    /// must be present.
    pub fn configuration_from_analysis(
        &self,
        analysis: &AnalysisReport,
        resource_type: Option<&str>,
        profile: Option<&str>,
    ) -> Result<MappingConfiguration> {
        let resource_type = resource_type
            .or(analysis.resource_type.as_deref())
            .context("the analysis does not name a resource type")?;
        Ok(self.configuration_from_mappings(
            resource_type,
            &analysis.mappings,
            &analysis.value_mappings,
            profile,
        ))
    }

    /// Registers a configuration, replacing any memoized one for its type.
    pub fn register_configuration(
        &self,
        configuration: MappingConfiguration,
    ) -> Result<Option<Arc<MappingConfiguration>>> {
        let resource_type = configuration.resource_type.clone();
        self.engine
            .register(configuration)
            .with_context(|| format!("register {resource_type} configuration"))
    }

    /// Maps a record, generating and registering a configuration from it on
    /// first use for the resource type.
    pub fn map_to_fhir(&self, record: &SourceRecord, resource_type: &str) -> Result<MappingReport> {
        let span = info_span!("map_to_fhir", resource_type);
        let _guard = span.enter();
        if !self.engine.is_configured(resource_type) {
            let configuration = self.generate_configuration(record, resource_type, None);
            info!(
                fields = configuration.field_mappings.len(),
                "generated configuration on first use"
            );
            self.register_configuration(configuration)?;
        }
        self.engine
            .map_to_fhir(record, resource_type)
            .with_context(|| format!("map record to {resource_type}"))
    }

    /// Applies `configuration` without registering it and validates the result.
    pub fn preview(
        &self,
        record: &SourceRecord,
        configuration: &MappingConfiguration,
    ) -> Result<PreviewResult> {
        let report = self
            .engine
            .apply(record, configuration)
            .with_context(|| format!("preview {} mapping", configuration.resource_type))?;
        let validation = self.validate_resource(&report.resource);
        debug!(
            resource_type = %configuration.resource_type,
            valid = validation.is_valid,
            "preview complete"
        );
        Ok(PreviewResult {
            resource: report.resource,
            validation,
            outcomes: report.outcomes,
        })
    }

    /// Writes a configuration to the repository.
    pub fn save_configuration(&self, configuration: &MappingConfiguration) -> Result<PathBuf> {
        self.require_repository()?.save(configuration)
    }

    /// Loads the stored configuration for `resource_type` and registers it.
    ///
    /// Returns `None` when nothing is stored for the type.
    pub fn load_configuration(&self, resource_type: &str) -> Result<Option<MappingConfiguration>> {
        let Some(configuration) = self.require_repository()?.load(resource_type)? else {
            return Ok(None);
        };
        self.register_configuration(configuration.clone())?;
        Ok(Some(configuration))
    }

    pub fn generate_mapper_class(&self, configuration: &MappingConfiguration) -> Result<String> {
        generate_mapper_source(configuration).with_context(|| {
            format!(
                "generate mapper source for {}",
                configuration.resource_type
            )
        })
    }

    pub fn validate_resource(&self, resource: &Resource) -> ValidationResult {
        validate_resource(resource, self.engine.registry())
    }

    pub fn suggest_improvements(
        &self,
        configuration: &MappingConfiguration,
    ) -> Vec<MappingSuggestion> {
        suggest_improvements(configuration, self.engine.registry())
    }

    fn require_repository(&self) -> Result<&ConfigurationRepository> {
        self.repository
            .as_ref()
            .ok_or_else(|| anyhow!("no configuration directory is set"))
    }
}
