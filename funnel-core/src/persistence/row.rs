//! The flattened results row: answers, derived scoring fields, contact
//! metadata, and offer outcome in one record keyed by `submission_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::funnel::OfferOutcome;
use crate::quiz::{keys, QuizSubmission};
use crate::scoring::ScoringResult;

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub submission_id: Uuid,

    pub email: String,
    pub first_name: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,

    pub age_range: String,
    pub gender: String,
    pub sleep_hours: i64,
    pub exercise_days: i64,
    pub stress_level: i64,
    pub diet_quality: String,
    pub energy_level: i64,
    pub symptoms: Vec<String>,

    pub score: i16,
    pub category: String,
    pub risk_level: String,
    pub recommended_tier: String,

    pub offer_status: String,
    pub final_tier: String,
    pub declines: i32,
    pub skipped_to_free: bool,

    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResultRow {
    /// Column order used by SQL-backed stores.
    pub const COLUMNS: [&'static str; 26] = [
        "submission_id",
        "email",
        "first_name",
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "utm_term",
        "utm_content",
        "age_range",
        "gender",
        "sleep_hours",
        "exercise_days",
        "stress_level",
        "diet_quality",
        "energy_level",
        "symptoms",
        "score",
        "category",
        "risk_level",
        "recommended_tier",
        "offer_status",
        "final_tier",
        "declines",
        "skipped_to_free",
        "submitted_at",
        "updated_at",
    ];

    /// Flatten a finalised submission, its scoring result, and the offer
    /// outcome so far.
    pub fn new(
        submission: &QuizSubmission,
        result: &ScoringResult,
        outcome: &OfferOutcome,
        now: DateTime<Utc>,
    ) -> Self {
        let answers = &submission.answers;
        let text = |key: &str| answers.choice(key).unwrap_or_default().to_string();
        let number = |key: &str| answers.number(key).unwrap_or_default();
        let contact = &submission.contact;

        Self {
            submission_id: submission.id.as_uuid(),
            email: contact.email.clone(),
            first_name: contact.first_name.clone(),
            utm_source: contact.utm.source.clone(),
            utm_medium: contact.utm.medium.clone(),
            utm_campaign: contact.utm.campaign.clone(),
            utm_term: contact.utm.term.clone(),
            utm_content: contact.utm.content.clone(),
            age_range: text(keys::AGE_RANGE),
            gender: text(keys::GENDER),
            sleep_hours: number(keys::SLEEP_HOURS),
            exercise_days: number(keys::EXERCISE_DAYS),
            stress_level: number(keys::STRESS_LEVEL),
            diet_quality: text(keys::DIET_QUALITY),
            energy_level: number(keys::ENERGY_LEVEL),
            symptoms: answers
                .choices(keys::SYMPTOMS)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            score: i16::from(result.score),
            category: result.category.as_str().to_string(),
            risk_level: result.risk_level.as_str().to_string(),
            recommended_tier: result.recommended_tier.as_str().to_string(),
            offer_status: outcome.status.as_str().to_string(),
            final_tier: outcome.final_tier.as_str().to_string(),
            declines: i32::try_from(outcome.declines).unwrap_or(i32::MAX),
            skipped_to_free: outcome.skipped_to_free,
            submitted_at: submission.submitted_at,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funnel::OutcomeStatus;
    use crate::offer::Tier;
    use crate::scoring::ScoringEngine;
    use crate::test_support::submission_scoring_85;

    #[test]
    fn test_columns_match_serialized_fields() {
        let submission = submission_scoring_85();
        let result = ScoringEngine::new().score(&submission.answers);
        let row = ResultRow::new(
            &submission,
            &result,
            &OfferOutcome::pending(Tier::Premium),
            Utc::now(),
        );
        let json = serde_json::to_value(&row).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), ResultRow::COLUMNS.len());
        for column in ResultRow::COLUMNS {
            assert!(object.contains_key(column), "missing column {}", column);
        }
    }

    #[test]
    fn test_row_flattens_answers_and_outcome() {
        let submission = submission_scoring_85();
        let result = ScoringEngine::new().score(&submission.answers);
        let outcome = OfferOutcome {
            status: OutcomeStatus::Accepted,
            final_tier: Tier::Digital,
            declines: 2,
            skipped_to_free: false,
        };
        let row = ResultRow::new(&submission, &result, &outcome, Utc::now());

        assert_eq!(row.submission_id, submission.id.as_uuid());
        assert_eq!(row.email, "maria@example.com");
        assert_eq!(row.utm_source.as_deref(), Some("newsletter"));
        assert_eq!(row.age_range, "45-59");
        assert_eq!(row.sleep_hours, 7);
        assert_eq!(row.symptoms, vec!["none".to_string()]);
        assert_eq!(row.score, 85);
        assert_eq!(row.category, "low");
        assert_eq!(row.recommended_tier, "premium");
        assert_eq!(row.offer_status, "accepted");
        assert_eq!(row.final_tier, "digital");
        assert_eq!(row.declines, 2);
    }
}
