//! Submitted answers, contact metadata, and submission identity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single response value.
///
/// Deserialises untagged: integers become `Number`, strings `Choice`,
/// string arrays `Choices`. Anything else (fractions, booleans, `null`,
/// objects) is kept as `Other` so validation can name the field instead of
/// failing the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Choice(String),
    Choices(Vec<String>),
    Other(serde_json::Value),
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AnswerValue {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Choice(s.to_string())
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(items: Vec<&str>) -> Self {
        Self::Choices(items.into_iter().map(String::from).collect())
    }
}

/// The complete, validated answer set. Only constructed by
/// [`super::QuizIntake::submit`], so every required question is present and
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizAnswer {
    values: BTreeMap<String, AnswerValue>,
}

impl QuizAnswer {
    pub(crate) fn new(values: BTreeMap<String, AnswerValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    pub fn number(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            AnswerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn choice(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            AnswerValue::Choice(c) => Some(c.as_str()),
            _ => None,
        }
    }

    pub fn choices(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key)? {
            AnswerValue::Choices(c) => Some(c.as_slice()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Campaign attribution captured from the landing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Utm {
    /// Trim every field and drop the ones left empty.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            source: clean(self.source),
            medium: clean(self.medium),
            campaign: clean(self.campaign),
            term: clean(self.term),
            content: clean(self.content),
        }
    }
}

/// Normalised contact fields attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Trimmed, lowercased address.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default)]
    pub utm: Utm,
}

/// Identity of a submission. Resubmitting with the same id upserts the
/// stored row instead of adding a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SubmissionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A finalised submission: validated answers plus contact metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSubmission {
    pub id: SubmissionId,
    pub answers: QuizAnswer,
    pub contact: Contact,
    pub submitted_at: DateTime<Utc>,
}

/// Unvalidated submission as received from a form post or JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub utm: Utm,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_value_untagged_json() {
        let raw: BTreeMap<String, AnswerValue> = serde_json::from_str(
            r#"{"sleep_hours": 7, "diet_quality": "good", "symptoms": ["fatigue"]}"#,
        )
        .unwrap();
        assert_eq!(raw["sleep_hours"], AnswerValue::Number(7));
        assert_eq!(raw["diet_quality"], AnswerValue::Choice("good".into()));
        assert_eq!(
            raw["symptoms"],
            AnswerValue::Choices(vec!["fatigue".into()])
        );
    }

    #[test]
    fn test_unexpected_json_shapes_still_parse() {
        let raw: BTreeMap<String, AnswerValue> = serde_json::from_str(
            r#"{"sleep_hours": 7.5, "stress_level": null, "gender": true, "symptoms": ["fatigue", 3]}"#,
        )
        .unwrap();
        assert_eq!(
            raw["sleep_hours"],
            AnswerValue::Other(serde_json::json!(7.5))
        );
        assert_eq!(raw["stress_level"], AnswerValue::Other(serde_json::Value::Null));
        assert_eq!(raw["gender"], AnswerValue::Other(serde_json::Value::Bool(true)));
        assert!(matches!(raw["symptoms"], AnswerValue::Other(_)));
    }

    #[test]
    fn test_utm_normalization_drops_blank_values() {
        let utm = Utm {
            source: Some("  facebook ".into()),
            medium: Some("   ".into()),
            campaign: None,
            term: Some(String::new()),
            content: Some("ad-7".into()),
        }
        .normalized();
        assert_eq!(utm.source.as_deref(), Some("facebook"));
        assert_eq!(utm.medium, None);
        assert_eq!(utm.term, None);
        assert_eq!(utm.content.as_deref(), Some("ad-7"));
    }

    #[test]
    fn test_submission_id_serializes_as_plain_uuid() {
        let uuid = Uuid::nil();
        let id = SubmissionId::from(uuid);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            format!("\"{}\"", uuid)
        );
    }
}
