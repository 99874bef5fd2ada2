#![deny(unsafe_code)]

//! Turning source values into FHIR element values.
//!
//! - **value**: value-mapping lookup and per-datatype transformation
//! - **datetime**: lenient date parsing and FHIR date/dateTime checks
//! - **coerce**: fitting a transformed value into an element definition

pub mod coerce;
pub mod datetime;
pub mod error;
pub mod value;

pub use coerce::coerce;
pub use datetime::{format_fhir_date, is_fhir_date, is_fhir_datetime, parse_date, to_fhir_date};
pub use error::TransformError;
pub use value::{TransformedValue, transform_value};
