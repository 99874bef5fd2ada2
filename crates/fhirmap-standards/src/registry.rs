//! Resource registry.
//!
//! Resource types are data: each [`ResourceDefinition`] names the type, the
//! elements the mapping engine may write, the elements validation requires
//! and the mapping checklist used for suggestions. Supporting a new resource
//! type means registering another definition.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use fhirmap_model::{IssueSeverity, MappingError, Resource, Result};

use crate::value_rules::ADMINISTRATIVE_GENDER_CODES;

const OBSERVATION_STATUS_CODES: &[&str] = &[
    "registered",
    "preliminary",
    "final",
    "amended",
    "corrected",
    "cancelled",
    "entered-in-error",
    "unknown",
];

/// An element the engine knows how to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDefinition {
    /// Path relative to the resource root, e.g. `name` or `name.family`.
    pub path: &'static str,
    /// FHIR type name (`string`, `date`, `HumanName`, `CodeableConcept`, ...).
    pub type_name: &'static str,
    /// Cardinality `0..*`.
    pub repeating: bool,
    /// Required value-set binding for coded elements.
    pub binding: Option<&'static [&'static str]>,
}

impl ElementDefinition {
    const fn new(path: &'static str, type_name: &'static str) -> Self {
        Self {
            path,
            type_name,
            repeating: false,
            binding: None,
        }
    }

    const fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }

    const fn bound_to(mut self, codes: &'static [&'static str]) -> Self {
        self.binding = Some(codes);
        self
    }

    /// Primitive FHIR types are spelled in lower camel case.
    pub fn is_primitive(&self) -> bool {
        self.type_name.starts_with(|c: char| c.is_ascii_lowercase())
    }

    pub fn name(&self) -> &'static str {
        self.path.rsplit('.').next().unwrap_or(self.path)
    }
}

/// An element a resource must carry to pass shallow validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredElement {
    pub element: &'static str,
    pub message: &'static str,
}

/// A target path a mapping configuration is expected to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistItem {
    pub target_path: &'static str,
    pub severity: IssueSeverity,
    pub message: &'static str,
    pub suggested_source_fields: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceDefinition {
    pub resource_type: &'static str,
    pub elements: &'static [ElementDefinition],
    pub required: &'static [RequiredElement],
    pub checklist: &'static [ChecklistItem],
}

impl ResourceDefinition {
    /// Builds an empty resource of this type.
    pub fn instantiate(&self) -> Resource {
        Resource::new(self.resource_type)
    }

    /// Element definition by path relative to the resource root.
    pub fn element(&self, path: &str) -> Option<&'static ElementDefinition> {
        self.elements.iter().find(|element| element.path == path)
    }
}

/// Resource definitions keyed by resource type name.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    definitions: BTreeMap<&'static str, ResourceDefinition>,
}

impl ResourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with Patient, Condition and Observation.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for definition in [PATIENT, CONDITION, OBSERVATION] {
            registry.register(definition);
        }
        registry
    }

    /// Adds or replaces a definition, returning the one it replaced.
    pub fn register(&mut self, definition: ResourceDefinition) -> Option<ResourceDefinition> {
        self.definitions.insert(definition.resource_type, definition)
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceDefinition> {
        self.definitions.get(resource_type)
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.definitions.contains_key(resource_type)
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }

    /// Looks up a definition, failing for unregistered types.
    pub fn definition(&self, resource_type: &str) -> Result<&ResourceDefinition> {
        self.get(resource_type)
            .ok_or_else(|| MappingError::UnknownResourceType {
                resource_type: resource_type.to_string(),
            })
    }

    pub fn instantiate(&self, resource_type: &str) -> Result<Resource> {
        self.definition(resource_type)
            .map(ResourceDefinition::instantiate)
    }
}

static DEFAULT_REGISTRY: LazyLock<ResourceRegistry> = LazyLock::new(ResourceRegistry::with_defaults);

/// The process-wide seeded registry.
pub fn default_registry() -> &'static ResourceRegistry {
    &DEFAULT_REGISTRY
}

const PATIENT: ResourceDefinition = ResourceDefinition {
    resource_type: "Patient",
    elements: &[
        ElementDefinition::new("identifier", "Identifier").repeating(),
        ElementDefinition::new("active", "boolean"),
        ElementDefinition::new("name", "HumanName").repeating(),
        ElementDefinition::new("name.use", "code"),
        ElementDefinition::new("name.text", "string"),
        ElementDefinition::new("name.family", "string"),
        ElementDefinition::new("name.given", "string").repeating(),
        ElementDefinition::new("name.prefix", "string").repeating(),
        ElementDefinition::new("name.suffix", "string").repeating(),
        ElementDefinition::new("telecom", "ContactPoint").repeating(),
        ElementDefinition::new("gender", "code").bound_to(ADMINISTRATIVE_GENDER_CODES),
        ElementDefinition::new("birthDate", "date"),
        ElementDefinition::new("deceasedBoolean", "boolean"),
        ElementDefinition::new("deceasedDateTime", "dateTime"),
        ElementDefinition::new("address", "Address").repeating(),
        ElementDefinition::new("address.use", "code"),
        ElementDefinition::new("address.text", "string"),
        ElementDefinition::new("address.line", "string").repeating(),
        ElementDefinition::new("address.city", "string"),
        ElementDefinition::new("address.district", "string"),
        ElementDefinition::new("address.state", "string"),
        ElementDefinition::new("address.postalCode", "string"),
        ElementDefinition::new("address.country", "string"),
        ElementDefinition::new("maritalStatus", "CodeableConcept"),
        ElementDefinition::new("multipleBirthBoolean", "boolean"),
        ElementDefinition::new("multipleBirthInteger", "integer"),
        ElementDefinition::new("generalPractitioner", "Reference").repeating(),
        ElementDefinition::new("managingOrganization", "Reference"),
    ],
    required: &[
        RequiredElement {
            element: "name",
            message: "Patient.name is required",
        },
        RequiredElement {
            element: "gender",
            message: "Patient.gender is required",
        },
    ],
    checklist: &[
        ChecklistItem {
            target_path: "Patient.name.family",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Patient.name.family (required by US Core)",
            suggested_source_fields: &["Last", "LastName", "Surname"],
        },
        ChecklistItem {
            target_path: "Patient.name.given[0]",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Patient.name.given (required by US Core)",
            suggested_source_fields: &["First", "FirstName", "GivenName"],
        },
        ChecklistItem {
            target_path: "Patient.gender",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Patient.gender (required by US Core)",
            suggested_source_fields: &["Gender", "Sex"],
        },
        ChecklistItem {
            target_path: "Patient.birthDate",
            severity: IssueSeverity::Warning,
            message: "Missing mapping for Patient.birthDate (recommended by US Core)",
            suggested_source_fields: &["BirthDate", "DOB", "DateOfBirth"],
        },
    ],
};

const CONDITION: ResourceDefinition = ResourceDefinition {
    resource_type: "Condition",
    elements: &[
        ElementDefinition::new("identifier", "Identifier").repeating(),
        ElementDefinition::new("clinicalStatus", "CodeableConcept"),
        ElementDefinition::new("verificationStatus", "CodeableConcept"),
        ElementDefinition::new("category", "CodeableConcept").repeating(),
        ElementDefinition::new("severity", "CodeableConcept"),
        ElementDefinition::new("code", "CodeableConcept"),
        ElementDefinition::new("code.text", "string"),
        ElementDefinition::new("bodySite", "CodeableConcept").repeating(),
        ElementDefinition::new("subject", "Reference"),
        ElementDefinition::new("subject.reference", "string"),
        ElementDefinition::new("subject.display", "string"),
        ElementDefinition::new("encounter", "Reference"),
        ElementDefinition::new("onsetDateTime", "dateTime"),
        ElementDefinition::new("onsetString", "string"),
        ElementDefinition::new("abatementDateTime", "dateTime"),
        ElementDefinition::new("abatementString", "string"),
        ElementDefinition::new("recordedDate", "dateTime"),
    ],
    required: &[
        RequiredElement {
            element: "subject",
            message: "Condition.subject is required",
        },
        RequiredElement {
            element: "code",
            message: "Condition.code is required",
        },
    ],
    checklist: &[
        ChecklistItem {
            target_path: "Condition.code",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Condition.code (required by US Core)",
            suggested_source_fields: &["Code", "IcdCode", "Diagnosis"],
        },
        ChecklistItem {
            target_path: "Condition.clinicalStatus",
            severity: IssueSeverity::Warning,
            message: "Missing mapping for Condition.clinicalStatus (recommended by US Core)",
            suggested_source_fields: &["Status", "ClinicalStatus", "Active"],
        },
        ChecklistItem {
            target_path: "Condition.onset[x]",
            severity: IssueSeverity::Warning,
            message: "Missing mapping for Condition.onset[x] (recommended by US Core)",
            suggested_source_fields: &["OnsetDate", "StartDate", "DateOfOnset"],
        },
    ],
};

const OBSERVATION: ResourceDefinition = ResourceDefinition {
    resource_type: "Observation",
    elements: &[
        ElementDefinition::new("identifier", "Identifier").repeating(),
        ElementDefinition::new("status", "code").bound_to(OBSERVATION_STATUS_CODES),
        ElementDefinition::new("category", "CodeableConcept").repeating(),
        ElementDefinition::new("code", "CodeableConcept"),
        ElementDefinition::new("code.text", "string"),
        ElementDefinition::new("subject", "Reference"),
        ElementDefinition::new("effectiveDateTime", "dateTime"),
        ElementDefinition::new("issued", "dateTime"),
        ElementDefinition::new("valueString", "string"),
        ElementDefinition::new("valueInteger", "integer"),
        ElementDefinition::new("valueBoolean", "boolean"),
        ElementDefinition::new("valueCodeableConcept", "CodeableConcept"),
        ElementDefinition::new("interpretation", "CodeableConcept").repeating(),
    ],
    required: &[
        RequiredElement {
            element: "status",
            message: "Observation.status is required",
        },
        RequiredElement {
            element: "code",
            message: "Observation.code is required",
        },
    ],
    checklist: &[
        ChecklistItem {
            target_path: "Observation.code",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Observation.code (required by US Core)",
            suggested_source_fields: &["Code", "LoincCode", "TestCode"],
        },
        ChecklistItem {
            target_path: "Observation.status",
            severity: IssueSeverity::Error,
            message: "Missing mapping for Observation.status (required by US Core)",
            suggested_source_fields: &["Status", "ResultStatus"],
        },
        ChecklistItem {
            target_path: "Observation.effectiveDateTime",
            severity: IssueSeverity::Info,
            message: "No mapping for Observation.effectiveDateTime",
            suggested_source_fields: &["ResultDate", "CollectedDate", "ObservationDate"],
        },
    ],
};
