use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tumorseg_core::{PowerProfile, ProcessingMode, DEFAULT_MAX_REGIONS};

use crate::error::SegmentError;

/// Where the accelerated threshold stage executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Sequential loop on the calling thread.
    Host,
    /// Separate worker with its own input copy and output buffer.
    #[default]
    Offload,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Offload => "offload",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown backend `{0}` (expected host or offload)")]
pub struct ParseBackendError(pub String);

impl FromStr for BackendKind {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(Self::Host),
            "offload" => Ok(Self::Offload),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

/// Pipeline configuration.
///
/// Every field has a default, so a partial JSON document such as
/// `{"mode": "careful"}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Forced processing mode. `None` selects the mode from image statistics.
    pub mode: Option<ProcessingMode>,
    /// Region cap for the labeler.
    pub max_regions: u16,
    pub backend: BackendKind,
    /// Re-run the stage on the host for timing and conformance.
    pub compare_baseline: bool,
    pub power: PowerProfile,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            mode: None,
            max_regions: DEFAULT_MAX_REGIONS,
            backend: BackendKind::default(),
            compare_baseline: true,
            power: PowerProfile::default(),
        }
    }
}

impl PipelineParams {
    pub fn from_json_str(json: &str) -> Result<Self, SegmentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SegmentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
