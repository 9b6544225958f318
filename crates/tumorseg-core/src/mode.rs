use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stats::ImageStatistics;

/// Minimum contrast for [`ProcessingMode::Fast`].
pub const FAST_MIN_CONTRAST: u8 = 150;
/// Minimum standard deviation for [`ProcessingMode::Fast`].
pub const FAST_MIN_STD_DEV: u8 = 50;
/// Minimum contrast for [`ProcessingMode::Normal`].
pub const NORMAL_MIN_CONTRAST: u8 = 80;
/// Minimum standard deviation for [`ProcessingMode::Normal`].
pub const NORMAL_MIN_STD_DEV: u8 = 25;

/// Post-processing intensity, ordered from lightest to heaviest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Otsu + binarize, no morphology.
    Fast = 0,
    /// Otsu + binarize + one open.
    Normal = 1,
    /// Otsu with the strict fallback + binarize + one open + one close.
    Careful = 2,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 3] = [Self::Fast, Self::Normal, Self::Careful];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Careful => "careful",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown processing mode `{0}` (expected fast, normal or careful)")]
pub struct ParseModeError(pub String);

impl FromStr for ProcessingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "0" => Ok(Self::Fast),
            "normal" | "1" => Ok(Self::Normal),
            "careful" | "2" => Ok(Self::Careful),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Map image statistics to a processing mode.
///
/// High contrast with a wide spread is easy to separate and gets the lightest
/// treatment; everything else falls through to `Careful`.
pub fn select_mode(stats: &ImageStatistics) -> ProcessingMode {
    if stats.contrast >= FAST_MIN_CONTRAST && stats.std_dev >= FAST_MIN_STD_DEV {
        ProcessingMode::Fast
    } else if stats.contrast >= NORMAL_MIN_CONTRAST && stats.std_dev >= NORMAL_MIN_STD_DEV {
        ProcessingMode::Normal
    } else {
        ProcessingMode::Careful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(contrast: u8, std_dev: u8) -> ImageStatistics {
        ImageStatistics {
            contrast,
            std_dev,
            ..ImageStatistics::default()
        }
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(select_mode(&stats(150, 50)), ProcessingMode::Fast);
        assert_eq!(select_mode(&stats(149, 50)), ProcessingMode::Normal);
        assert_eq!(select_mode(&stats(150, 49)), ProcessingMode::Normal);
        assert_eq!(select_mode(&stats(80, 25)), ProcessingMode::Normal);
        assert_eq!(select_mode(&stats(79, 25)), ProcessingMode::Careful);
        assert_eq!(select_mode(&stats(80, 24)), ProcessingMode::Careful);
        assert_eq!(select_mode(&stats(0, 0)), ProcessingMode::Careful);
    }

    #[test]
    fn every_statistics_pair_maps_to_exactly_one_mode() {
        for contrast in 0..=255u8 {
            for std_dev in 0..=255u8 {
                let s = stats(contrast, std_dev);
                let fast = contrast >= 150 && std_dev >= 50;
                let normal = !fast && contrast >= 80 && std_dev >= 25;
                let expected = if fast {
                    ProcessingMode::Fast
                } else if normal {
                    ProcessingMode::Normal
                } else {
                    ProcessingMode::Careful
                };
                assert_eq!(select_mode(&s), expected);
                assert_eq!(select_mode(&s), select_mode(&s));
            }
        }
    }

    #[test]
    fn modes_are_ordered_by_intensity() {
        assert!(ProcessingMode::Fast < ProcessingMode::Normal);
        assert!(ProcessingMode::Normal < ProcessingMode::Careful);
    }

    #[test]
    fn parses_names_and_indices() {
        assert_eq!("FAST".parse::<ProcessingMode>(), Ok(ProcessingMode::Fast));
        assert_eq!("normal".parse::<ProcessingMode>(), Ok(ProcessingMode::Normal));
        assert_eq!("2".parse::<ProcessingMode>(), Ok(ProcessingMode::Careful));
        assert!("turbo".parse::<ProcessingMode>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ProcessingMode::Careful).expect("serialize");
        assert_eq!(json, "\"careful\"");
        let back: ProcessingMode = serde_json::from_str("\"fast\"").expect("deserialize");
        assert_eq!(back, ProcessingMode::Fast);
    }
}
