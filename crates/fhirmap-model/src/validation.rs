use serde::{Deserialize, Serialize};

/// Severity of a validation issue or configuration suggestion.
///
/// Ordered by importance: sorting ascending puts errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    /// Element path the issue refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Outcome of a shallow resource validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error and marks the result invalid.
    pub fn push_error(&mut self, message: impl Into<String>, path: Option<String>) {
        self.is_valid = false;
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Error,
            message: message.into(),
            path,
        });
    }

    pub fn push_warning(&mut self, message: impl Into<String>, path: Option<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            message: message.into(),
            path,
        });
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// A proposed improvement to a mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub severity: IssueSeverity,
    pub message: String,
    /// Target path that has no field mapping.
    pub target_path: String,
    /// Example source field names a reviewer might map to the target.
    pub suggested_source_fields: Vec<String>,
}
