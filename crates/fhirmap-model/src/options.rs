//! Configuration options for discovery and mapping.

use serde::{Deserialize, Serialize};

/// How configuration registration treats target paths and duplicate source fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPolicy {
    /// Reject unsupported or mismatched paths and duplicate source fields at registration.
    Strict,
    /// Accept the configuration; problem mappings are reported per field at apply time.
    #[default]
    Lenient,
}

/// Confidence constants used by field analysis and configuration generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryThresholds {
    /// Confidence given to the placeholder mapping of an unmatched field (default: 0.1).
    pub unknown_confidence: f64,
    /// Unknown mappings below this confidence are dropped from generated
    /// configurations (default: 0.3).
    pub noise_cutoff: f64,
}

impl Default for DiscoveryThresholds {
    fn default() -> Self {
        Self {
            unknown_confidence: 0.1,
            noise_cutoff: 0.3,
        }
    }
}

impl DiscoveryThresholds {
    #[must_use]
    pub fn with_unknown_confidence(mut self, confidence: f64) -> Self {
        self.unknown_confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_noise_cutoff(mut self, cutoff: f64) -> Self {
        self.noise_cutoff = cutoff;
        self
    }
}

/// Options shared by the analyzer, generator and mapping engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    pub path_policy: PathPolicy,
    pub thresholds: DiscoveryThresholds,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reject questionable configurations at registration time.
    pub fn strict() -> Self {
        Self {
            path_policy: PathPolicy::Strict,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: DiscoveryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}
