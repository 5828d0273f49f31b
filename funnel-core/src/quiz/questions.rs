//! The fixed assessment question set.
//!
//! Every question is required. Points per question range over
//! `0..=MAX_POINTS`; the weight scales a question's contribution to the raw
//! total. Weights sum to 25, so the raw maximum is exactly 100.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::answers::AnswerValue;
use super::validation::FieldProblem;

/// Highest point value any single question can award.
pub const MAX_POINTS: u8 = 4;

/// The multi-select option that means "no symptoms". Cannot be combined
/// with any other symptom.
pub const NO_SYMPTOMS: &str = "none";

/// Question keys, shared with the flattened result row.
pub mod keys {
    pub const AGE_RANGE: &str = "age_range";
    pub const GENDER: &str = "gender";
    pub const SLEEP_HOURS: &str = "sleep_hours";
    pub const EXERCISE_DAYS: &str = "exercise_days";
    pub const STRESS_LEVEL: &str = "stress_level";
    pub const DIET_QUALITY: &str = "diet_quality";
    pub const ENERGY_LEVEL: &str = "energy_level";
    pub const SYMPTOMS: &str = "symptoms";
}

/// Step of the intake form a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Demographics,
    Lifestyle,
    Symptoms,
}

impl Section {
    /// Form order.
    pub const ORDER: [Section; 3] = [Self::Demographics, Self::Lifestyle, Self::Symptoms];
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Demographics => write!(f, "demographics"),
            Self::Lifestyle => write!(f, "lifestyle"),
            Self::Symptoms => write!(f, "symptoms"),
        }
    }
}

/// Half-open point band `[lo, hi)` over a numeric answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBand {
    pub lo: i64,
    pub hi: i64,
    pub points: u8,
}

const fn band(lo: i64, hi: i64, points: u8) -> PointBand {
    PointBand { lo, hi, points }
}

/// Shape of the accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Exactly one of the listed options, each with its point value.
    Choice {
        options: &'static [(&'static str, u8)],
    },
    /// Integer in `min..=max`, scored by the first matching band.
    Number {
        min: i64,
        max: i64,
        bands: &'static [PointBand],
    },
    /// One or more of the listed options. Fewer selections score higher.
    MultiChoice { options: &'static [&'static str] },
}

impl QuestionKind {
    fn expected(&self) -> &'static str {
        match self {
            Self::Choice { .. } => "choice",
            Self::Number { .. } => "number",
            Self::MultiChoice { .. } => "list of choices",
        }
    }
}

/// A single question in the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub key: &'static str,
    pub section: Section,
    pub kind: QuestionKind,
    pub weight: u8,
}

impl Question {
    /// Highest weighted contribution this question can make.
    pub fn max_weighted(&self) -> u32 {
        u32::from(self.weight) * u32::from(MAX_POINTS)
    }

    /// Check that `value` is an acceptable answer to this question.
    pub fn check(&self, value: &AnswerValue) -> Result<(), FieldProblem> {
        match (&self.kind, value) {
            (_, AnswerValue::Other(serde_json::Value::Null)) => Err(FieldProblem::Missing),
            (QuestionKind::Choice { options }, AnswerValue::Choice(choice)) => {
                if options.iter().any(|(name, _)| *name == choice) {
                    Ok(())
                } else {
                    Err(FieldProblem::UnknownOption {
                        value: choice.clone(),
                    })
                }
            }
            (QuestionKind::Number { min, max, .. }, AnswerValue::Number(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(FieldProblem::OutOfRange {
                        min: *min,
                        max: *max,
                        value: *n,
                    })
                }
            }
            (QuestionKind::MultiChoice { options }, AnswerValue::Choices(selected)) => {
                if selected.is_empty() {
                    return Err(FieldProblem::Missing);
                }
                if let Some(unknown) = selected
                    .iter()
                    .find(|s| !options.iter().any(|o| *o == s.as_str()))
                {
                    return Err(FieldProblem::UnknownOption {
                        value: unknown.clone(),
                    });
                }
                if let Some(repeated) = selected
                    .iter()
                    .enumerate()
                    .find_map(|(i, s)| selected[..i].contains(s).then_some(s))
                {
                    return Err(FieldProblem::Duplicate {
                        value: repeated.clone(),
                    });
                }
                if selected.len() > 1 && selected.iter().any(|s| s == NO_SYMPTOMS) {
                    return Err(FieldProblem::Conflicting {
                        option: NO_SYMPTOMS.to_string(),
                    });
                }
                Ok(())
            }
            (kind, _) => Err(FieldProblem::WrongKind {
                expected: kind.expected(),
            }),
        }
    }

    /// Points awarded for `value`. Values that fail [`Question::check`] earn
    /// nothing.
    pub fn points(&self, value: &AnswerValue) -> u8 {
        match (&self.kind, value) {
            (QuestionKind::Choice { options }, AnswerValue::Choice(choice)) => options
                .iter()
                .find(|(name, _)| *name == choice)
                .map(|(_, points)| *points)
                .unwrap_or(0),
            (QuestionKind::Number { bands, .. }, AnswerValue::Number(n)) => bands
                .iter()
                .find(|b| b.lo <= *n && *n < b.hi)
                .map(|b| b.points)
                .unwrap_or(0),
            (QuestionKind::MultiChoice { .. }, AnswerValue::Choices(selected)) => {
                let distinct: BTreeSet<&str> = selected
                    .iter()
                    .map(String::as_str)
                    .filter(|s| *s != NO_SYMPTOMS)
                    .collect();
                let count = distinct.len();
                MAX_POINTS.saturating_sub(count.min(usize::from(MAX_POINTS)) as u8)
            }
            _ => 0,
        }
    }
}

/// The assessment, in form order.
pub const QUESTIONS: &[Question] = &[
    Question {
        key: keys::AGE_RANGE,
        section: Section::Demographics,
        kind: QuestionKind::Choice {
            options: &[("18-29", 4), ("30-44", 4), ("45-59", 3), ("60+", 2)],
        },
        weight: 2,
    },
    Question {
        key: keys::GENDER,
        section: Section::Demographics,
        kind: QuestionKind::Choice {
            options: &[
                ("female", 0),
                ("male", 0),
                ("non_binary", 0),
                ("prefer_not_to_say", 0),
            ],
        },
        weight: 0,
    },
    Question {
        key: keys::SLEEP_HOURS,
        section: Section::Lifestyle,
        kind: QuestionKind::Number {
            min: 0,
            max: 24,
            bands: &[
                band(0, 5, 0),
                band(5, 6, 2),
                band(6, 7, 3),
                band(7, 9, 4),
                band(9, 25, 3),
            ],
        },
        weight: 5,
    },
    Question {
        key: keys::EXERCISE_DAYS,
        section: Section::Lifestyle,
        kind: QuestionKind::Number {
            min: 0,
            max: 7,
            bands: &[band(0, 1, 0), band(1, 3, 2), band(3, 5, 3), band(5, 8, 4)],
        },
        weight: 5,
    },
    Question {
        key: keys::STRESS_LEVEL,
        section: Section::Lifestyle,
        kind: QuestionKind::Number {
            min: 1,
            max: 10,
            bands: &[band(1, 4, 4), band(4, 7, 2), band(7, 11, 0)],
        },
        weight: 5,
    },
    Question {
        key: keys::DIET_QUALITY,
        section: Section::Lifestyle,
        kind: QuestionKind::Choice {
            options: &[("poor", 0), ("fair", 2), ("good", 3), ("excellent", 4)],
        },
        weight: 3,
    },
    Question {
        key: keys::ENERGY_LEVEL,
        section: Section::Symptoms,
        kind: QuestionKind::Number {
            min: 1,
            max: 10,
            bands: &[band(1, 4, 0), band(4, 7, 2), band(7, 11, 4)],
        },
        weight: 3,
    },
    Question {
        key: keys::SYMPTOMS,
        section: Section::Symptoms,
        kind: QuestionKind::MultiChoice {
            options: &[
                "fatigue",
                "brain_fog",
                "joint_pain",
                "digestive",
                "poor_sleep",
                NO_SYMPTOMS,
            ],
        },
        weight: 2,
    },
];

/// Look up a question by key.
pub fn question(key: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.key == key)
}

/// Raw maximum of the weighted sum across the question set.
pub fn max_raw_points() -> u32 {
    QUESTIONS.iter().map(Question::max_weighted).sum()
}
