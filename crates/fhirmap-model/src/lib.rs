#![deny(unsafe_code)]

//! Data model for configuration-driven legacy-to-FHIR mapping.

pub mod configuration;
pub mod datatypes;
pub mod discovery;
pub mod error;
pub mod options;
pub mod outcome;
pub mod privacy;
pub mod record;
pub mod resource;
pub mod validation;

pub use configuration::{
    FhirDataType, FieldMapping, MappingConfiguration, UNKNOWN_TARGET, ValueMapping,
};
pub use datatypes::{
    CodeableConcept, Coding, ContactPoint, ContactPointSystem, ContactPointUse, Identifier,
    UnknownCode,
};
pub use discovery::{PotentialMapping, ValueMappingCandidate};
pub use error::{MappingError, Result};
pub use options::{DiscoveryThresholds, EngineOptions, PathPolicy};
pub use outcome::{FieldOutcome, FieldStatus, MappingReport};
pub use privacy::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data_enabled};
pub use record::{SourceRecord, SourceValue};
pub use resource::{Meta, Resource, has_content};
pub use validation::{IssueSeverity, MappingSuggestion, ValidationIssue, ValidationResult};
