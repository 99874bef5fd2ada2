//! Library side of the `fhirmap` command: the discovery service facade and
//! logging setup.

pub mod discovery;
pub mod logging;

pub use discovery::{AnalysisReport, DiscoveryService, PreviewResult};
