use thiserror::Error;

/// Why a transformed value could not be written into an element.
///
/// Messages never include the value itself; they end up in logs and
/// mapping reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("cannot assign a {from} value to {element} ({type_name})")]
    Incompatible {
        from: &'static str,
        element: &'static str,
        type_name: &'static str,
    },

    #[error("value is not a valid FHIR {type_name} for {element}")]
    InvalidFormat {
        element: &'static str,
        type_name: &'static str,
    },

    #[error("code is not in the value set bound to {element}")]
    OutsideBinding { element: &'static str },

    #[error("integer value for {element} is out of range")]
    OutOfRange { element: &'static str },
}
