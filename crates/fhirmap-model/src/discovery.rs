//! Analysis output types.
//!
//! These are transient: they are produced by the field analyzer, reviewed by
//! a human or consumed by the configuration generator, and never persisted.

use serde::{Deserialize, Serialize};

use crate::configuration::{FhirDataType, UNKNOWN_TARGET, ValueMapping};

/// A candidate binding of one source field to one FHIR target path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialMapping {
    /// Source field name.
    pub source_property: String,
    /// Stringified sample value.
    pub source_value: String,
    /// Runtime type name of the sample value (e.g. `String`, `Integer`).
    pub source_type: String,
    pub target_fhir_path: String,
    pub target_fhir_type: FhirDataType,
    /// Heuristic score in `[0, 1]`.
    pub confidence: f64,
    pub transformation_needed: bool,
}

impl PotentialMapping {
    /// Returns true for the placeholder emitted when no pattern matched.
    pub fn is_unknown(&self) -> bool {
        self.target_fhir_path == UNKNOWN_TARGET
    }
}

/// A value mapping proposed during analysis, with the confidence of the
/// normalization that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMappingCandidate {
    #[serde(flatten)]
    pub value_mapping: ValueMapping,
    pub confidence: f64,
}

impl ValueMappingCandidate {
    pub fn new(value_mapping: ValueMapping, confidence: f64) -> Self {
        Self {
            value_mapping,
            confidence,
        }
    }
}
