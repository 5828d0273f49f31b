//! Score classification bands.
//!
//! All bands are half-open `[lo, hi)` over the 0..=100 score, with the top
//! band closed at 100. A score equal to a threshold belongs to the band that
//! starts there.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    /// `[70, 100]`
    Low,
    /// `[40, 70)`
    Normal,
    /// `[0, 40)`
    High,
}

pub const NORMAL_RISK_FROM: u8 = 40;
pub const LOW_RISK_FROM: u8 = 70;

impl ScoreCategory {
    pub fn for_score(score: u8) -> Self {
        if score >= LOW_RISK_FROM {
            Self::Low
        } else if score >= NORMAL_RISK_FROM {
            Self::Normal
        } else {
            Self::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Human label, e.g. "low risk".
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low risk",
            Self::Normal => "normal risk",
            Self::High => "high risk",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained risk level, in steps of 20 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// `[80, 100]`
    Minimal,
    /// `[60, 80)`
    Mild,
    /// `[40, 60)`
    Moderate,
    /// `[20, 40)`
    Elevated,
    /// `[0, 20)`
    Severe,
}

pub const ELEVATED_FROM: u8 = 20;
pub const MODERATE_FROM: u8 = 40;
pub const MILD_FROM: u8 = 60;
pub const MINIMAL_FROM: u8 = 80;

impl RiskLevel {
    pub fn for_score(score: u8) -> Self {
        if score >= MINIMAL_FROM {
            Self::Minimal
        } else if score >= MILD_FROM {
            Self::Mild
        } else if score >= MODERATE_FROM {
            Self::Moderate
        } else if score >= ELEVATED_FROM {
            Self::Elevated
        } else {
            Self::Severe
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Elevated => "elevated",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(ScoreCategory::for_score(0), ScoreCategory::High);
        assert_eq!(ScoreCategory::for_score(NORMAL_RISK_FROM - 1), ScoreCategory::High);
        assert_eq!(ScoreCategory::for_score(NORMAL_RISK_FROM), ScoreCategory::Normal);
        assert_eq!(ScoreCategory::for_score(LOW_RISK_FROM - 1), ScoreCategory::Normal);
        assert_eq!(ScoreCategory::for_score(LOW_RISK_FROM), ScoreCategory::Low);
        assert_eq!(ScoreCategory::for_score(100), ScoreCategory::Low);
    }

    #[test]
    fn test_risk_level_boundaries() {
        let cases = [
            (0, RiskLevel::Severe),
            (19, RiskLevel::Severe),
            (20, RiskLevel::Elevated),
            (39, RiskLevel::Elevated),
            (40, RiskLevel::Moderate),
            (59, RiskLevel::Moderate),
            (60, RiskLevel::Mild),
            (79, RiskLevel::Mild),
            (80, RiskLevel::Minimal),
            (100, RiskLevel::Minimal),
        ];
        for (score, expected) in cases {
            assert_eq!(RiskLevel::for_score(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ScoreCategory::Low.label(), "low risk");
        assert_eq!(ScoreCategory::High.to_string(), "high");
        assert_eq!(
            serde_json::to_string(&RiskLevel::Elevated).unwrap(),
            "\"elevated\""
        );
    }
}
