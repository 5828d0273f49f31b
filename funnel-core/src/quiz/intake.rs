//! Multi-step intake: collects answers section by section, validating each
//! one as it arrives, and seals them into a [`QuizSubmission`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use super::answers::{
    AnswerValue, Contact, QuizAnswer, QuizSubmission, RawSubmission, SubmissionId, Utm,
};
use super::questions::{question, Section, QUESTIONS};
use super::validation::{FieldError, FieldProblem, ValidationError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_RE regex should compile")
});

/// Contact field names reported in validation errors.
pub const EMAIL_FIELD: &str = "email";

/// In-progress quiz. Answers can be given in any order and overwritten until
/// [`QuizIntake::submit`] consumes the intake.
#[derive(Debug, Clone)]
pub struct QuizIntake {
    id: SubmissionId,
    answers: BTreeMap<String, AnswerValue>,
    email: Option<String>,
    first_name: Option<String>,
    utm: Utm,
}

impl QuizIntake {
    /// Start a fresh intake with a new submission id.
    pub fn new() -> Self {
        Self::resume(SubmissionId::new())
    }

    /// Start an intake that will upsert over an earlier submission.
    pub fn resume(id: SubmissionId) -> Self {
        Self {
            id,
            answers: BTreeMap::new(),
            email: None,
            first_name: None,
            utm: Utm::default(),
        }
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Record one answer. Rejected answers leave any earlier value untouched.
    pub fn answer(&mut self, key: &str, value: impl Into<AnswerValue>) -> Result<(), FieldError> {
        let q =
            question(key).ok_or_else(|| FieldError::new(key, FieldProblem::UnknownQuestion))?;
        let value = value.into();
        q.check(&value).map_err(|problem| FieldError::new(key, problem))?;
        debug!(submission_id = %self.id, question = key, "Answer recorded");
        self.answers.insert(key.to_string(), value);
        Ok(())
    }

    /// Set contact details. Validated on submit.
    pub fn contact(&mut self, email: impl Into<String>, first_name: Option<String>) {
        self.email = Some(email.into());
        self.first_name = first_name;
    }

    pub fn utm(&mut self, utm: Utm) {
        self.utm = utm;
    }

    /// First form section that still has unanswered questions, or `None`
    /// once every question is answered.
    pub fn current_section(&self) -> Option<Section> {
        Section::ORDER.into_iter().find(|section| {
            QUESTIONS
                .iter()
                .any(|q| q.section == *section && !self.answers.contains_key(q.key))
        })
    }

    /// Keys of required questions not yet answered, in form order.
    pub fn missing(&self) -> Vec<&'static str> {
        QUESTIONS
            .iter()
            .filter(|q| !self.answers.contains_key(q.key))
            .map(|q| q.key)
            .collect()
    }

    /// Seal the intake. Fails with every missing or invalid field listed.
    pub fn submit(self) -> Result<QuizSubmission, ValidationError> {
        let mut errors = Vec::new();

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(FieldError::missing(EMAIL_FIELD));
                None
            }
            Some(raw) => {
                let email = raw.to_lowercase();
                if EMAIL_RE.is_match(&email) {
                    Some(email)
                } else {
                    errors.push(FieldError::new(EMAIL_FIELD, FieldProblem::InvalidEmail));
                    None
                }
            }
        };

        errors.extend(self.missing().into_iter().map(FieldError::missing));

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        let contact = Contact {
            email: email.unwrap_or_default(),
            first_name: self
                .first_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            utm: self.utm.normalized(),
        };

        Ok(QuizSubmission {
            id: self.id,
            answers: QuizAnswer::new(self.answers),
            contact,
            submitted_at: Utc::now(),
        })
    }
}

impl Default for QuizIntake {
    fn default() -> Self {
        Self::new()
    }
}

impl RawSubmission {
    /// Validate a whole submission at once, collecting every field error
    /// rather than stopping at the first.
    pub fn validate(self) -> Result<QuizSubmission, ValidationError> {
        let mut intake = match self.submission_id {
            Some(id) => QuizIntake::resume(id.into()),
            None => QuizIntake::new(),
        };

        let mut errors = Vec::new();
        for (key, value) in self.answers {
            if let Err(e) = intake.answer(&key, value) {
                errors.push(e);
            }
        }
        if let Some(email) = self.email {
            intake.contact(email, self.first_name);
        }
        intake.utm(self.utm);

        match intake.submit() {
            Ok(submission) if errors.is_empty() => Ok(submission),
            Ok(_) => Err(ValidationError::new(errors)),
            Err(mut rejected) => {
                // Keep invalid-value errors; drop the "missing" entries they caused.
                rejected
                    .errors
                    .retain(|e| !errors.iter().any(|prior| prior.field == e.field));
                errors.extend(rejected.errors);
                Err(ValidationError::new(errors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::questions::keys;

    fn filled() -> QuizIntake {
        let mut intake = QuizIntake::new();
        intake.answer(keys::AGE_RANGE, "30-44").unwrap();
        intake.answer(keys::GENDER, "female").unwrap();
        intake.answer(keys::SLEEP_HOURS, 7).unwrap();
        intake.answer(keys::EXERCISE_DAYS, 3).unwrap();
        intake.answer(keys::STRESS_LEVEL, 5).unwrap();
        intake.answer(keys::DIET_QUALITY, "fair").unwrap();
        intake.answer(keys::ENERGY_LEVEL, 6).unwrap();
        intake.answer(keys::SYMPTOMS, vec!["fatigue"]).unwrap();
        intake
    }

    #[test]
    fn test_sections_advance_in_form_order() {
        let mut intake = QuizIntake::new();
        assert_eq!(intake.current_section(), Some(Section::Demographics));
        intake.answer(keys::AGE_RANGE, "18-29").unwrap();
        intake.answer(keys::GENDER, "male").unwrap();
        assert_eq!(intake.current_section(), Some(Section::Lifestyle));
        assert!(filled().current_section().is_none());
    }

    #[test]
    fn test_rejected_answer_keeps_previous_value() {
        let mut intake = filled();
        let err = intake.answer(keys::SLEEP_HOURS, 30).unwrap_err();
        assert_eq!(err.field, keys::SLEEP_HOURS);
        assert!(intake.missing().is_empty());
    }

    #[test]
    fn test_unknown_question_rejected() {
        let mut intake = QuizIntake::new();
        let err = intake.answer("favourite_colour", "blue").unwrap_err();
        assert_eq!(err.problem, FieldProblem::UnknownQuestion);
    }

    #[test]
    fn test_submit_without_email_names_the_field() {
        let err = filled().submit().unwrap_err();
        assert_eq!(err.missing_fields(), vec![EMAIL_FIELD]);
    }

    #[test]
    fn test_submit_lists_all_missing_answers() {
        let mut intake = QuizIntake::new();
        intake.contact("a@b.co", None);
        intake.answer(keys::AGE_RANGE, "60+").unwrap();
        let err = intake.submit().unwrap_err();
        let missing = err.missing_fields();
        assert_eq!(missing.len(), 7);
        assert!(missing.contains(&keys::SYMPTOMS));
        assert!(!missing.contains(&keys::AGE_RANGE));
    }

    #[test]
    fn test_email_is_normalized() {
        let mut intake = filled();
        intake.contact("  Jo.Doe@Example.COM ", Some("  Jo ".into()));
        let submission = intake.submit().unwrap();
        assert_eq!(submission.contact.email, "jo.doe@example.com");
        assert_eq!(submission.contact.first_name.as_deref(), Some("Jo"));
    }

    #[test]
    fn test_malformed_email_rejected() {
        let mut intake = filled();
        intake.contact("not-an-address", None);
        let err = intake.submit().unwrap_err();
        assert_eq!(
            err.field(EMAIL_FIELD).map(|e| &e.problem),
            Some(&FieldProblem::InvalidEmail)
        );
    }

    #[test]
    fn test_raw_submission_reports_bad_value_once() {
        let raw: RawSubmission = serde_json::from_str(
            r#"{
                "email": "x@y.io",
                "answers": {
                    "age_range": "30-44", "gender": "male", "sleep_hours": 40,
                    "exercise_days": 2, "stress_level": 3, "diet_quality": "good",
                    "energy_level": 7, "symptoms": ["none"]
                }
            }"#,
        )
        .unwrap();
        let err = raw.validate().unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(matches!(
            err.errors[0].problem,
            FieldProblem::OutOfRange { value: 40, .. }
        ));
    }

    #[test]
    fn test_raw_submission_names_wrong_kind_and_null_answers() {
        let raw: RawSubmission = serde_json::from_str(
            r#"{
                "email": "x@y.io",
                "answers": {
                    "age_range": "30-44", "gender": "male", "sleep_hours": 7.5,
                    "exercise_days": true, "stress_level": null, "diet_quality": "good",
                    "energy_level": 7, "symptoms": ["fatigue", "fatigue"]
                }
            }"#,
        )
        .unwrap();
        let err = raw.validate().unwrap_err();
        assert_eq!(err.errors.len(), 4);
        assert_eq!(
            err.field(keys::SLEEP_HOURS).map(|e| &e.problem),
            Some(&FieldProblem::WrongKind { expected: "number" })
        );
        assert_eq!(
            err.field(keys::EXERCISE_DAYS).map(|e| &e.problem),
            Some(&FieldProblem::WrongKind { expected: "number" })
        );
        assert_eq!(err.missing_fields(), vec![keys::STRESS_LEVEL]);
        assert!(matches!(
            err.field(keys::SYMPTOMS).map(|e| &e.problem),
            Some(FieldProblem::Duplicate { .. })
        ));
    }

    #[test]
    fn test_raw_submission_keeps_supplied_id() {
        let id = uuid::Uuid::new_v4();
        let mut raw = RawSubmission {
            submission_id: Some(id),
            email: Some("x@y.io".into()),
            ..Default::default()
        };
        for (k, v) in [
            (keys::AGE_RANGE, AnswerValue::from("18-29")),
            (keys::GENDER, "female".into()),
            (keys::SLEEP_HOURS, 8.into()),
            (keys::EXERCISE_DAYS, 4.into()),
            (keys::STRESS_LEVEL, 2.into()),
            (keys::DIET_QUALITY, "excellent".into()),
            (keys::ENERGY_LEVEL, 9.into()),
            (keys::SYMPTOMS, vec!["none"].into()),
        ] {
            raw.answers.insert(k.to_string(), v);
        }
        let submission = raw.validate().unwrap();
        assert_eq!(submission.id.as_uuid(), id);
    }
}
