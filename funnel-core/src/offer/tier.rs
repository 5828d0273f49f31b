//! Offer tiers, ordered from lowest to highest commitment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named offer level shown to a user.
///
/// Ordering follows commitment: `Free < Digital < Regular < Premium`.
/// Unknown strings deserialise to `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Tier {
    Free,
    Digital,
    Regular,
    Premium,
}

/// Score at which each tier becomes the recommendation. Bands are half-open:
/// a score equal to a threshold belongs to the higher tier.
pub const DIGITAL_FROM: u8 = 40;
pub const REGULAR_FROM: u8 = 60;
pub const PREMIUM_FROM: u8 = 80;

impl Tier {
    /// Tiers in decline order.
    pub const DESCENDING: [Tier; 4] = [Self::Premium, Self::Regular, Self::Digital, Self::Free];

    /// Recommended tier for a 0..=100 score.
    pub fn for_score(score: u8) -> Self {
        if score >= PREMIUM_FROM {
            Self::Premium
        } else if score >= REGULAR_FROM {
            Self::Regular
        } else if score >= DIGITAL_FROM {
            Self::Digital
        } else {
            Self::Free
        }
    }

    /// The next tier down. `Free` stays `Free`.
    pub fn next_lower(self) -> Self {
        match self {
            Self::Premium => Self::Regular,
            Self::Regular => Self::Digital,
            Self::Digital | Self::Free => Self::Free,
        }
    }

    /// Whether no further downgrade is possible.
    pub fn is_terminal(self) -> bool {
        self == Self::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Regular => "regular",
            Self::Digital => "digital",
            Self::Free => "free",
        }
    }

    /// Parse a tier name, falling back to `Free` for anything unrecognised.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_else(|e: UnknownTier| {
            warn!(value = %e.0, "Unknown tier value, falling back to free");
            Self::Free
        })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by the strict [`FromStr`] impl.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "premium" => Ok(Self::Premium),
            "regular" => Ok(Self::Regular),
            "digital" => Ok(Self::Digital),
            "free" => Ok(Self::Free),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Self::parse_lossy(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_commitment() {
        assert!(Tier::Premium > Tier::Regular);
        assert!(Tier::Regular > Tier::Digital);
        assert!(Tier::Digital > Tier::Free);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(Tier::for_score(0), Tier::Free);
        assert_eq!(Tier::for_score(DIGITAL_FROM - 1), Tier::Free);
        assert_eq!(Tier::for_score(DIGITAL_FROM), Tier::Digital);
        assert_eq!(Tier::for_score(REGULAR_FROM - 1), Tier::Digital);
        assert_eq!(Tier::for_score(REGULAR_FROM), Tier::Regular);
        assert_eq!(Tier::for_score(PREMIUM_FROM - 1), Tier::Regular);
        assert_eq!(Tier::for_score(PREMIUM_FROM), Tier::Premium);
        assert_eq!(Tier::for_score(100), Tier::Premium);
    }

    #[test]
    fn test_next_lower_is_monotonic() {
        for tier in Tier::DESCENDING {
            let lower = tier.next_lower();
            assert!(lower <= tier);
            if !tier.is_terminal() {
                assert!(lower < tier);
            }
        }
    }

    #[test]
    fn test_unknown_tier_falls_back_to_free() {
        assert_eq!(Tier::parse_lossy("platinum"), Tier::Free);
        assert_eq!(Tier::parse_lossy(""), Tier::Free);
        assert_eq!(Tier::parse_lossy(" Premium "), Tier::Premium);
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn test_serde_lowercase_and_lossy() {
        assert_eq!(serde_json::to_string(&Tier::Digital).unwrap(), "\"digital\"");
        let tier: Tier = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(tier, Tier::Regular);
        let tier: Tier = serde_json::from_str("\"vip\"").unwrap();
        assert_eq!(tier, Tier::Free);
    }
}
