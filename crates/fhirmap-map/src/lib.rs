#![deny(unsafe_code)]

//! Discovery and mapping of legacy records onto FHIR resources.
//!
//! [`FieldAnalyzer`] proposes targets for source fields,
//! [`ConfigurationGenerator`] turns proposals into a
//! [`MappingConfiguration`](fhirmap_model::MappingConfiguration), and
//! [`MappingEngine`] applies registered configurations to records.

pub mod analyzer;
pub mod codegen;
pub mod engine;
pub mod generator;
pub mod path;
pub mod repository;
pub mod store;

pub use analyzer::{FieldAnalyzer, ValueHints, transformation_needed};
pub use codegen::{generate_mapper_source, parse_mapper_source};
pub use engine::MappingEngine;
pub use generator::{ConfigurationGenerator, PathAnnotations, infer_path_annotations};
pub use path::TargetPath;
pub use repository::{ConfigurationRepository, MappingMetadata, StoredMappingConfiguration};
pub use store::{ConfigurationStore, check_configuration};
