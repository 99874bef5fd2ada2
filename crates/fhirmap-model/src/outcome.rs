//! Per-field results of applying a mapping configuration.

use serde::Serialize;

use crate::resource::Resource;

/// What happened to one field mapping during an apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FieldStatus {
    /// The transformed value was written into the resource.
    Applied,
    /// The source record has no such field.
    SkippedMissing,
    /// The source value was null and the mapping does not allow nulls.
    SkippedNull,
    /// The value could not be coerced into the target element.
    SkippedCoercion { reason: String },
    /// The target path has a shape the engine does not write to.
    SkippedUnsupportedPath { reason: String },
    /// The mapping could not be applied at all (e.g. wrong resource type in the path).
    Failed { reason: String },
}

impl FieldStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::SkippedMissing => "skipped (missing)",
            Self::SkippedNull => "skipped (null)",
            Self::SkippedCoercion { .. } => "skipped (coercion)",
            Self::SkippedUnsupportedPath { .. } => "skipped (unsupported path)",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::SkippedCoercion { reason }
            | Self::SkippedUnsupportedPath { reason }
            | Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    pub source_field: String,
    pub target_fhir_path: String,
    #[serde(flatten)]
    pub status: FieldStatus,
}

/// The (possibly partially populated) resource and one outcome per field mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingReport {
    pub resource: Resource,
    pub outcomes: Vec<FieldOutcome>,
}

impl MappingReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_applied())
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.status.is_applied() && !outcome.status.is_failed())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_failed())
            .count()
    }

    /// Outcome of the last field mapping reading `source_field`.
    pub fn outcome_for(&self, source_field: &str) -> Option<&FieldStatus> {
        self.outcomes
            .iter()
            .rev()
            .find(|outcome| outcome.source_field == source_field)
            .map(|outcome| &outcome.status)
    }
}
