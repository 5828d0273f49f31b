//! Quiz intake: question set, answers, and validation.

pub mod answers;
pub mod intake;
pub mod questions;
pub mod validation;

pub use answers::{
    AnswerValue, Contact, QuizAnswer, QuizSubmission, RawSubmission, SubmissionId, Utm,
};
pub use intake::{QuizIntake, EMAIL_FIELD};
pub use questions::{keys, question, Question, QuestionKind, Section, QUESTIONS};
pub use validation::{FieldError, FieldProblem, ValidationError};
