//! Scoring engine: weighted sum of answer points, normalised to 0..=100.
//!
//! Pure and deterministic. Input is a validated [`QuizAnswer`], so every
//! question is present; there is no error path.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::bands::{RiskLevel, ScoreCategory};
use crate::offer::Tier;
use crate::quiz::{Question, QuizAnswer, QuizSubmission, QUESTIONS};

/// Contribution of one question to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub key: String,
    pub points: u8,
    pub weight: u8,
    pub weighted: u32,
}

/// Derived once from a submission; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Normalised score, 0..=100.
    pub score: u8,
    pub raw_points: u32,
    pub max_points: u32,
    pub category: ScoreCategory,
    pub risk_level: RiskLevel,
    pub recommended_tier: Tier,
    pub breakdown: Vec<QuestionScore>,
}

impl ScoringResult {
    /// Build the classification for an already normalised score.
    fn classify(
        score: u8,
        raw_points: u32,
        max_points: u32,
        breakdown: Vec<QuestionScore>,
    ) -> Self {
        Self {
            score,
            raw_points,
            max_points,
            category: ScoreCategory::for_score(score),
            risk_level: RiskLevel::for_score(score),
            recommended_tier: Tier::for_score(score),
            breakdown,
        }
    }
}

/// Round-half-up `raw / max` onto 0..=100 using integer arithmetic.
pub fn normalize(raw: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let raw = raw.min(max);
    ((raw * 100 + max / 2) / max) as u8
}

/// Maps answers to a score against a fixed question set.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    questions: &'static [Question],
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            questions: QUESTIONS,
        }
    }

    /// Score a validated answer set.
    pub fn score(&self, answers: &QuizAnswer) -> ScoringResult {
        let breakdown: Vec<QuestionScore> = self
            .questions
            .iter()
            .map(|q| {
                let points = answers.get(q.key).map(|v| q.points(v)).unwrap_or(0);
                QuestionScore {
                    key: q.key.to_string(),
                    points,
                    weight: q.weight,
                    weighted: u32::from(points) * u32::from(q.weight),
                }
            })
            .collect();

        let raw: u32 = breakdown.iter().map(|s| s.weighted).sum();
        let max: u32 = self.questions.iter().map(Question::max_weighted).sum();
        ScoringResult::classify(normalize(raw, max), raw, max, breakdown)
    }

    /// Score a submission, logging the outcome.
    pub fn score_submission(&self, submission: &QuizSubmission) -> ScoringResult {
        let result = self.score(&submission.answers);
        info!(
            submission_id = %submission.id,
            score = result.score,
            category = %result.category,
            risk_level = %result.risk_level,
            tier = %result.recommended_tier,
            "Assessment scored"
        );
        result
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
