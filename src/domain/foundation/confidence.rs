//! Extraction confidence value object.
//!
//! The extraction oracle scores each answer on a five-step scale. Arbitrary
//! floats coming off the wire snap to the nearest step so the rest of the
//! domain can treat confidence as a closed enum.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How confidently an answer was extracted from the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Confidence {
    /// 0.0 - not mentioned anywhere.
    #[default]
    NotMentioned,
    /// 0.25 - weakly implied.
    Weak,
    /// 0.5 - partially clear or inferred.
    Partial,
    /// 0.75 - clearly implied or inferred from context.
    Strong,
    /// 1.0 - explicitly stated.
    Certain,
}

impl Confidence {
    /// Snaps an arbitrary score to the nearest discrete step.
    pub fn from_score(score: f64) -> Self {
        let clamped = score.clamp(0.0, 1.0);
        match (clamped * 4.0).round() as u8 {
            0 => Confidence::NotMentioned,
            1 => Confidence::Weak,
            2 => Confidence::Partial,
            3 => Confidence::Strong,
            _ => Confidence::Certain,
        }
    }

    /// Returns the numeric score for this step.
    pub fn score(&self) -> f64 {
        match self {
            Confidence::NotMentioned => 0.0,
            Confidence::Weak => 0.25,
            Confidence::Partial => 0.5,
            Confidence::Strong => 0.75,
            Confidence::Certain => 1.0,
        }
    }

    /// True when the oracle found any trace of an answer.
    pub fn is_extracted(&self) -> bool {
        *self != Confidence::NotMentioned
    }

    /// True at or above the 0.75 step; feeds the answer-quality bonus.
    pub fn is_high(&self) -> bool {
        *self >= Confidence::Strong
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score())
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.score())
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let score = f64::deserialize(deserializer)?;
        if !score.is_finite() {
            return Err(DeError::custom("confidence must be a finite number"));
        }
        Ok(Confidence::from_score(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_score_maps_exact_steps() {
        assert_eq!(Confidence::from_score(0.0), Confidence::NotMentioned);
        assert_eq!(Confidence::from_score(0.25), Confidence::Weak);
        assert_eq!(Confidence::from_score(0.5), Confidence::Partial);
        assert_eq!(Confidence::from_score(0.75), Confidence::Strong);
        assert_eq!(Confidence::from_score(1.0), Confidence::Certain);
    }

    #[test]
    fn from_score_snaps_to_nearest_step() {
        assert_eq!(Confidence::from_score(0.1), Confidence::NotMentioned);
        assert_eq!(Confidence::from_score(0.2), Confidence::Weak);
        assert_eq!(Confidence::from_score(0.6), Confidence::Partial);
        assert_eq!(Confidence::from_score(0.8), Confidence::Strong);
        assert_eq!(Confidence::from_score(0.95), Confidence::Certain);
    }

    #[test]
    fn from_score_clamps_out_of_range() {
        assert_eq!(Confidence::from_score(-1.0), Confidence::NotMentioned);
        assert_eq!(Confidence::from_score(2.5), Confidence::Certain);
    }

    #[test]
    fn high_confidence_starts_at_strong() {
        assert!(!Confidence::Partial.is_high());
        assert!(Confidence::Strong.is_high());
        assert!(Confidence::Certain.is_high());
    }

    #[test]
    fn not_mentioned_is_not_extracted() {
        assert!(!Confidence::NotMentioned.is_extracted());
        assert!(Confidence::Weak.is_extracted());
    }

    #[test]
    fn serializes_as_numeric_score() {
        assert_eq!(serde_json::to_string(&Confidence::Strong).unwrap(), "0.75");
    }

    #[test]
    fn deserializes_and_snaps() {
        let c: Confidence = serde_json::from_str("0.7").unwrap();
        assert_eq!(c, Confidence::Strong);
    }
}
