//! Shared fixtures for unit tests.

use crate::quiz::{keys, QuizIntake, QuizSubmission, Utm};

/// A complete submission that scores exactly 85:
/// 6 (age) + 20 (sleep) + 20 (exercise) + 10 (stress) + 9 (diet) + 12 (energy)
/// + 8 (symptoms).
pub fn submission_scoring_85() -> QuizSubmission {
    let mut intake = QuizIntake::new();
    intake.contact(" Maria@Example.com ", Some("Maria".into()));
    intake.utm(Utm {
        source: Some("newsletter".into()),
        campaign: Some(" ".into()),
        ..Utm::default()
    });
    intake.answer(keys::AGE_RANGE, "45-59").unwrap();
    intake.answer(keys::GENDER, "female").unwrap();
    intake.answer(keys::SLEEP_HOURS, 7).unwrap();
    intake.answer(keys::EXERCISE_DAYS, 5).unwrap();
    intake.answer(keys::STRESS_LEVEL, 5).unwrap();
    intake.answer(keys::DIET_QUALITY, "good").unwrap();
    intake.answer(keys::ENERGY_LEVEL, 8).unwrap();
    intake.answer(keys::SYMPTOMS, vec!["none"]).unwrap();
    intake.submit().unwrap()
}
