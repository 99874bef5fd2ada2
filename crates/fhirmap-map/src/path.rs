//! Target path parsing.
//!
//! The engine writes to `Type.property` and `Type.container.property` paths
//! made of plain identifiers. Bracketed qualifiers, indices and deeper
//! nesting are not supported.

use fhirmap_model::{MappingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPath<'a> {
    pub resource_type: &'a str,
    pub container: Option<&'a str>,
    pub property: &'a str,
}

impl<'a> TargetPath<'a> {
    pub fn parse(path: &'a str) -> Result<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        if let Some(segment) = segments.iter().find(|segment| !is_identifier(segment)) {
            return Err(MappingError::unsupported_path(
                path,
                format!("segment `{segment}` is not a plain element name"),
            ));
        }
        match segments[..] {
            [resource_type, property] => Ok(Self {
                resource_type,
                container: None,
                property,
            }),
            [resource_type, container, property] => Ok(Self {
                resource_type,
                container: Some(container),
                property,
            }),
            _ => Err(MappingError::unsupported_path(
                path,
                format!("expected 2 or 3 segments, found {}", segments.len()),
            )),
        }
    }

    /// Path relative to the resource root, as used by element definitions.
    pub fn element_path(&self) -> String {
        match self.container {
            Some(container) => format!("{container}.{}", self.property),
            None => self.property.to_string(),
        }
    }

    /// Fails with `InvalidPath` unless the first segment names `resource_type`.
    pub fn ensure_resource_type(&self, resource_type: &str) -> Result<()> {
        if self.resource_type == resource_type {
            Ok(())
        } else {
            Err(MappingError::invalid_path(
                self.to_string(),
                format!("path must start with resource type {resource_type}"),
            ))
        }
    }
}

impl std::fmt::Display for TargetPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.element_path())
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_shapes() {
        let path = TargetPath::parse("Patient.gender").unwrap();
        assert_eq!(path.container, None);
        assert_eq!(path.element_path(), "gender");

        let path = TargetPath::parse("Patient.address.postalCode").unwrap();
        assert_eq!(path.resource_type, "Patient");
        assert_eq!(path.container, Some("address"));
        assert_eq!(path.element_path(), "address.postalCode");
        assert_eq!(path.to_string(), "Patient.address.postalCode");
    }

    #[test]
    fn rejects_brackets_indices_and_depth() {
        for path in [
            "Patient.name.given[0]",
            "Patient.telecom[system='phone'][use='home']",
            "Condition.onset[x]",
            "Patient",
            "Patient.contact.name.family",
            "Patient..gender",
            "Unknown",
        ] {
            assert!(
                matches!(
                    TargetPath::parse(path),
                    Err(MappingError::UnsupportedPath { .. })
                ),
                "{path}"
            );
        }
    }

    #[test]
    fn resource_type_mismatch_is_invalid() {
        let path = TargetPath::parse("Condition.code").unwrap();
        assert!(path.ensure_resource_type("Condition").is_ok());
        assert!(matches!(
            path.ensure_resource_type("Patient"),
            Err(MappingError::InvalidPath { .. })
        ));
    }
}
