//! Offer State Machine — the decline loop as explicit states and events.
//!
//! The current tier only ever moves down:
//! ```text
//! premium ─decline─▶ regular ─decline─▶ digital ─decline─▶ free ─decline─▶ free
//!    └──────────────┴──────skip_to_free──────┴──────────────▶ free
//! ```
//! `free` is terminal. Every event, including a no-op decline at `free`, is
//! recorded in the transition log so a session can be replayed.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::tier::Tier;
use crate::scoring::ScoringResult;

/// User actions that move the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferEvent {
    /// Reject the current offer; show the next tier down.
    Decline,
    /// Jump straight to the free offer.
    SkipToFree,
}

impl fmt::Display for OfferEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decline => write!(f, "decline"),
            Self::SkipToFree => write!(f, "skip_to_free"),
        }
    }
}

/// The transition table. Total over every (state, event) pair.
fn next_tier(from: Tier, event: OfferEvent) -> Tier {
    match event {
        OfferEvent::Decline => from.next_lower(),
        OfferEvent::SkipToFree => Tier::Free,
    }
}

/// A single recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: Tier,
    pub to: Tier,
    pub event: OfferEvent,
    /// Milliseconds since the offer was first shown.
    pub elapsed_ms: u64,
}

impl TransitionRecord {
    /// Whether the event moved the offer (false for decline at `free`).
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Current tier shown to the user, plus its transition history.
#[derive(Debug, Clone)]
pub struct OfferState {
    initial: Tier,
    current: Tier,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl OfferState {
    /// Start at `initial`.
    pub fn new(initial: Tier) -> Self {
        Self {
            initial,
            current: initial,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    /// Start at the scoring result's recommended tier.
    pub fn from_result(result: &ScoringResult) -> Self {
        Self::new(result.recommended_tier)
    }

    pub fn current(&self) -> Tier {
        self.current
    }

    pub fn initial(&self) -> Tier {
        self.initial
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Apply an event and return the resulting tier.
    pub fn apply(&mut self, event: OfferEvent) -> Tier {
        let from = self.current;
        let to = next_tier(from, event);
        debug_assert!(to <= from, "offer tier must never increase");

        tracing::debug!(from = %from, to = %to, event = %event, "Offer transition");

        self.transitions.push(TransitionRecord {
            from,
            to,
            event,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
        });
        self.current = to;
        to
    }

    pub fn decline(&mut self) -> Tier {
        self.apply(OfferEvent::Decline)
    }

    pub fn skip_to_free(&mut self) -> Tier {
        self.apply(OfferEvent::SkipToFree)
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Number of decline events received, including no-ops at `free`.
    pub fn declines(&self) -> u32 {
        self.transitions
            .iter()
            .filter(|t| t.event == OfferEvent::Decline)
            .count() as u32
    }

    pub fn skipped_to_free(&self) -> bool {
        self.transitions
            .iter()
            .any(|t| t.event == OfferEvent::SkipToFree)
    }

    /// One-line history, e.g. `premium → digital (12ms, 2 transitions) [regular → digital]`.
    pub fn summary(&self) -> String {
        let path: Vec<&str> = self.transitions.iter().map(|t| t.to.as_str()).collect();
        let mut line = format!(
            "{} → {} ({}ms, {} transitions)",
            self.initial,
            self.current,
            self.created_at.elapsed().as_millis(),
            self.transitions.len(),
        );
        if !path.is_empty() {
            line.push_str(&format!(" [{}]", path.join(" → ")));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let offer = OfferState::new(Tier::Regular);
        assert_eq!(offer.current(), Tier::Regular);
        assert_eq!(offer.initial(), Tier::Regular);
        assert!(!offer.is_terminal());
        assert!(offer.transitions().is_empty());
    }

    #[test]
    fn test_decline_chain_from_premium() {
        let mut offer = OfferState::new(Tier::Premium);
        let seen: Vec<Tier> = (0..4).map(|_| offer.decline()).collect();
        assert_eq!(
            seen,
            vec![Tier::Regular, Tier::Digital, Tier::Free, Tier::Free]
        );
        assert!(offer.is_terminal());
        assert_eq!(offer.declines(), 4);
    }

    #[test]
    fn test_decline_at_free_is_noop() {
        let mut offer = OfferState::new(Tier::Free);
        assert_eq!(offer.decline(), Tier::Free);
        let record = &offer.transitions()[0];
        assert_eq!(record.from, Tier::Free);
        assert_eq!(record.to, Tier::Free);
        assert!(!record.changed());
    }

    #[test]
    fn test_skip_to_free_from_every_state() {
        for tier in Tier::DESCENDING {
            let mut offer = OfferState::new(tier);
            assert_eq!(offer.skip_to_free(), Tier::Free);
            assert_eq!(offer.transitions().len(), 1);
            assert!(offer.skipped_to_free());
        }
    }

    #[test]
    fn test_never_reenters_higher_tier() {
        let events = [
            OfferEvent::Decline,
            OfferEvent::SkipToFree,
            OfferEvent::Decline,
            OfferEvent::Decline,
        ];
        for start in Tier::DESCENDING {
            let mut offer = OfferState::new(start);
            let mut previous = start;
            for event in events {
                let now = offer.apply(event);
                assert!(now <= previous);
                previous = now;
            }
        }
    }

    #[test]
    fn test_transition_record_serde_roundtrip() {
        let record = TransitionRecord {
            from: Tier::Premium,
            to: Tier::Regular,
            event: OfferEvent::Decline,
            elapsed_ms: 1500,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"event\":\"decline\""));
        let restored: TransitionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_summary() {
        let mut offer = OfferState::new(Tier::Premium);
        offer.decline();
        offer.skip_to_free();
        let summary = offer.summary();
        assert!(summary.starts_with("premium → free"));
        assert!(summary.contains("2 transitions"));
        assert!(summary.contains("[regular → free]"));
    }
}
