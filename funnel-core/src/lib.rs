//! Wellness Quiz Funnel Core
//!
//! This library provides:
//! - The fixed assessment question set and a multi-step intake that validates
//!   answers as they arrive
//! - A pure, deterministic scoring engine (weighted sum → category, risk level,
//!   recommended tier)
//! - The offer state machine driving the decline loop
//!   (premium → regular → digital → free)
//! - A persistence adapter that upserts one result row per submission without
//!   blocking the funnel
//!
//! # Flow
//!
//! ```text
//! QuizIntake ──submit──▶ QuizSubmission ──ScoringEngine──▶ ScoringResult
//!                                                             │
//!                                  FunnelSession::start ◀─────┘
//!                                      │  decline / skip_to_free
//!                                      ▼
//!                               OfferState (+ OfferPresenter)
//!                                      │  accept / abandon
//!                                      ▼
//!                     PersistenceAdapter::spawn ──▶ ResultStore::upsert
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod funnel;
pub mod offer;
pub mod persistence;
pub mod quiz;
pub mod scoring;

#[cfg(test)]
pub(crate) mod test_support;

pub use funnel::{FunnelReceipt, FunnelSession, OfferPresenter, OfferOutcome, OutcomeStatus};
pub use offer::{OfferCatalog, OfferEvent, OfferState, OfferView, Tier, TransitionRecord};
pub use persistence::{
    MemoryResultStore, PersistError, PersistHandle, PersistenceAdapter, ResultRow, ResultStore,
    UpsertOutcome, WriteBarrier,
};
pub use quiz::{
    AnswerValue, Contact, FieldError, FieldProblem, QuizAnswer, QuizIntake, QuizSubmission,
    RawSubmission, Section, SubmissionId, Utm, ValidationError,
};
pub use scoring::{RiskLevel, ScoreCategory, ScoringEngine, ScoringResult};
