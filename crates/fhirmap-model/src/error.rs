use thiserror::Error;

/// Structural failures raised to callers of the mapping engine.
///
/// Field-level problems (missing source fields, failed coercions, unparseable
/// dates) are not errors; they are reported as
/// [`FieldStatus`](crate::FieldStatus) outcomes instead.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no mapping configuration registered for resource type {resource_type}")]
    ConfigurationNotFound { resource_type: String },

    #[error("invalid target path {path}: {message}")]
    InvalidPath { path: String, message: String },

    #[error("unsupported target path {path}: {message}")]
    UnsupportedPath { path: String, message: String },

    #[error("unknown resource type {resource_type}")]
    UnknownResourceType { resource_type: String },

    #[error("source field {field} is mapped more than once in the {resource_type} configuration")]
    DuplicateSourceField {
        resource_type: String,
        field: String,
    },

    #[error("generated mapper source does not embed a configuration")]
    MissingEmbeddedConfiguration,

    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

impl MappingError {
    pub fn configuration_not_found(resource_type: impl Into<String>) -> Self {
        Self::ConfigurationNotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedPath {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
