//! Recall quality on the SM-2 0–5 scale, and the mappings onto it.
//!
//! Quality ratings:
//! - 0: Complete blackout
//! - 1: Incorrect, answer recognized once shown
//! - 2: Incorrect, answer seemed easy once shown
//! - 3: Correct with serious difficulty
//! - 4: Correct after hesitation
//! - 5: Perfect response

use crate::error::{Result, ReviewError};
use serde::{Deserialize, Serialize};

/// Lowest quality that counts as a successful recall.
pub const SUCCESS_THRESHOLD: u8 = 3;

/// Quality recorded for a "knew it" swipe.
pub const SWIPE_CORRECT_QUALITY: Quality = Quality(5);

/// Quality recorded for a "didn't know it" swipe.
pub const SWIPE_INCORRECT_QUALITY: Quality = Quality(2);

/// A recall grade in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    /// Validate a raw quality value. Out-of-range values are rejected, never clamped.
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(ReviewError::QualityOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this grade counts as a successful recall.
    pub fn is_success(self) -> bool {
        self.0 >= SUCCESS_THRESHOLD
    }
}

impl TryFrom<u8> for Quality {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Map the binary review signal onto the quality scale.
pub fn map_swipe_to_quality(correct: bool) -> Quality {
    if correct {
        SWIPE_CORRECT_QUALITY
    } else {
        SWIPE_INCORRECT_QUALITY
    }
}

/// Rating for hosts that show four graded buttons instead of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            _ => Err(ReviewError::RatingOutOfRange(value)),
        }
    }

    pub fn to_quality(self) -> Quality {
        match self {
            Self::Again => Quality(1),
            Self::Hard => Quality(3),
            Self::Good => Quality(4),
            Self::Easy => Quality(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn swipe_constants_straddle_threshold() {
        assert!(map_swipe_to_quality(true).is_success());
        assert!(!map_swipe_to_quality(false).is_success());
        assert_eq!(map_swipe_to_quality(true).value(), 5);
        assert_eq!(map_swipe_to_quality(false).value(), 2);
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert_eq!(Quality::new(6), Err(ReviewError::QualityOutOfRange(6)));
        assert!(Quality::try_from(5).is_ok());
        assert!(Quality::new(0).is_ok());
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Quality = serde_json::from_str("3").unwrap();
        assert_eq!(ok.value(), 3);
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }

    #[test]
    fn rating_maps_again_to_failure() {
        assert!(!Rating::Again.to_quality().is_success());
        assert!(Rating::Hard.to_quality().is_success());
        assert_eq!(Rating::from_value(4), Ok(Rating::Easy));
        assert_eq!(Rating::from_value(0), Err(ReviewError::RatingOutOfRange(0)));
    }
}
