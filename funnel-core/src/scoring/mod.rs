//! Assessment scoring: weighted sum, normalisation, and classification.

pub mod bands;
pub mod engine;

pub use bands::{RiskLevel, ScoreCategory};
pub use engine::{normalize, QuestionScore, ScoringEngine, ScoringResult};
