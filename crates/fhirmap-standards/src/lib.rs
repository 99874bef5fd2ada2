#![deny(unsafe_code)]

//! Static knowledge the mapping engine is seeded with.

pub mod patterns;
pub mod registry;
pub mod value_rules;

pub use patterns::{PatternRule, pattern_resource_types, patterns_for};
pub use registry::{
    ChecklistItem, ElementDefinition, RequiredElement, ResourceDefinition, ResourceRegistry,
    default_registry,
};
pub use value_rules::{
    ADMINISTRATIVE_GENDER_CODES, ADMINISTRATIVE_GENDER_SYSTEM, ValueNormalizer, ValueRule,
    administrative_gender, value_rules_for,
};
