//! Funnel session: scoring → offer display → decline loop → persistence.
//!
//! Each user action is a synchronous `&mut self` call that completes before
//! the next one. Persistence never blocks the session: the scored result is
//! written as soon as the session starts, and the final offer outcome is
//! upserted over it when the session ends. The final upsert waits in the
//! background for the first one to settle, so it always lands last.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::offer::{OfferCatalog, OfferEvent, OfferState, OfferView, Tier, TransitionRecord};
use crate::persistence::{PersistHandle, PersistenceAdapter, ResultRow, WriteBarrier};
use crate::quiz::{QuizSubmission, SubmissionId};
use crate::scoring::{ScoringEngine, ScoringResult};

/// Rendering collaborator. Told which offer view to show whenever the tier
/// changes (and once at the start).
pub trait OfferPresenter: Send {
    fn show(&mut self, view: &OfferView);
}

impl<F> OfferPresenter for F
where
    F: FnMut(&OfferView) + Send,
{
    fn show(&mut self, view: &OfferView) {
        self(view)
    }
}

/// How the offer loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Still deciding; the row was written when scoring finished.
    Pending,
    /// Took the offer at `final_tier`.
    Accepted,
    /// Left without accepting anything.
    DeclinedAll,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::DeclinedAll => "declined_all",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offer result recorded alongside the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferOutcome {
    pub status: OutcomeStatus,
    pub final_tier: Tier,
    pub declines: u32,
    pub skipped_to_free: bool,
}

impl OfferOutcome {
    pub fn pending(tier: Tier) -> Self {
        Self {
            status: OutcomeStatus::Pending,
            final_tier: tier,
            declines: 0,
            skipped_to_free: false,
        }
    }

    pub fn from_state(status: OutcomeStatus, offer: &OfferState) -> Self {
        Self {
            status,
            final_tier: offer.current(),
            declines: offer.declines(),
            skipped_to_free: offer.skipped_to_free(),
        }
    }
}

/// What a finished session hands back.
#[derive(Debug)]
pub struct FunnelReceipt {
    pub submission_id: SubmissionId,
    pub result: ScoringResult,
    pub outcome: OfferOutcome,
    pub transitions: Vec<TransitionRecord>,
    /// The final upsert. Await it to surface a warning, or drop it.
    pub persist: PersistHandle,
}

/// One user's pass through the funnel.
pub struct FunnelSession<P: OfferPresenter> {
    submission: QuizSubmission,
    result: ScoringResult,
    offer: OfferState,
    catalog: OfferCatalog,
    presenter: P,
    persistence: PersistenceAdapter,
    last_write: Option<WriteBarrier>,
}

impl<P: OfferPresenter> FunnelSession<P> {
    /// Score the submission, show the recommended offer, and start writing
    /// the result in the background.
    pub fn start(
        submission: QuizSubmission,
        engine: &ScoringEngine,
        catalog: OfferCatalog,
        mut presenter: P,
        persistence: PersistenceAdapter,
    ) -> (Self, PersistHandle) {
        let result = engine.score_submission(&submission);
        let offer = OfferState::from_result(&result);
        presenter.show(catalog.view(offer.current()));

        let mut session = Self {
            submission,
            result,
            offer,
            catalog,
            presenter,
            persistence,
            last_write: None,
        };
        let handle = session.persist(OutcomeStatus::Pending);
        (session, handle)
    }

    pub fn result(&self) -> &ScoringResult {
        &self.result
    }

    pub fn submission(&self) -> &QuizSubmission {
        &self.submission
    }

    pub fn current_tier(&self) -> Tier {
        self.offer.current()
    }

    pub fn current_view(&self) -> &OfferView {
        self.catalog.view(self.offer.current())
    }

    pub fn offer_state(&self) -> &OfferState {
        &self.offer
    }

    /// User rejected the current offer.
    pub fn decline(&mut self) -> &OfferView {
        self.apply(OfferEvent::Decline)
    }

    /// User asked for the free option directly.
    pub fn skip_to_free(&mut self) -> &OfferView {
        self.apply(OfferEvent::SkipToFree)
    }

    fn apply(&mut self, event: OfferEvent) -> &OfferView {
        let before = self.offer.current();
        let tier = self.offer.apply(event);
        let view = self.catalog.view(tier);
        if tier != before {
            self.presenter.show(view);
        }
        view
    }

    /// User took the offer currently shown.
    pub fn accept(self) -> FunnelReceipt {
        self.finish(OutcomeStatus::Accepted)
    }

    /// User left without accepting.
    pub fn abandon(self) -> FunnelReceipt {
        self.finish(OutcomeStatus::DeclinedAll)
    }

    fn finish(mut self, status: OutcomeStatus) -> FunnelReceipt {
        let persist = self.persist(status);
        let outcome = OfferOutcome::from_state(status, &self.offer);
        info!(
            submission_id = %self.submission.id,
            status = %status,
            final_tier = %outcome.final_tier,
            declines = outcome.declines,
            history = %self.offer.summary(),
            "Funnel finished"
        );
        FunnelReceipt {
            submission_id: self.submission.id,
            result: self.result,
            outcome,
            transitions: self.offer.transitions().to_vec(),
            persist,
        }
    }

    fn persist(&mut self, status: OutcomeStatus) -> PersistHandle {
        let outcome = match status {
            OutcomeStatus::Pending => OfferOutcome::pending(self.offer.current()),
            _ => OfferOutcome::from_state(status, &self.offer),
        };
        let row = ResultRow::new(&self.submission, &self.result, &outcome, Utc::now());
        let (handle, barrier) = self.persistence.spawn_after(self.last_write.take(), row);
        self.last_write = Some(barrier);
        handle
    }
}
