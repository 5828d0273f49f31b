//! Persistence adapter: bounded, logged writes that never block the funnel.
//!
//! `spawn()` hands the write to a Tokio task and returns immediately. The
//! returned [`PersistHandle`] can be awaited to collect the outcome, or simply
//! dropped; the write completes (or fails) on its own either way. Failures are
//! logged with `warn!` and are never fatal.
//!
//! Writes for the same submission are ordered with [`WriteBarrier`]:
//! `spawn_after()` holds its upsert until the earlier write has settled, so
//! an older row can never land on top of a newer one, whatever the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::{PersistError, PersistResult};
use super::row::ResultRow;
use super::store::{ResultStore, UpsertOutcome};

/// Default per-write timeout.
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Writes result rows to a [`ResultStore`].
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn ResultStore>,
    timeout: Duration,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Upsert `row` and wait for the outcome. Failures are logged here, so
    /// callers only need to decide whether to surface a warning.
    pub async fn persist(&self, row: ResultRow) -> PersistResult<UpsertOutcome> {
        let result = write_row(self.store.as_ref(), &row, self.timeout).await;
        log_outcome(self.store.name(), &row, &result);
        result
    }

    /// Upsert `row` in the background.
    pub fn spawn(&self, row: ResultRow) -> PersistHandle {
        self.spawn_after(None, row).0
    }

    /// Upsert `row` in the background once the write behind `after` has
    /// settled. The returned barrier settles when this write does.
    pub fn spawn_after(
        &self,
        after: Option<WriteBarrier>,
        row: ResultRow,
    ) -> (PersistHandle, WriteBarrier) {
        let (done, barrier) = WriteBarrier::new();
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                let err = PersistError::NoRuntime;
                warn!(
                    submission_id = %row.submission_id,
                    error = %err,
                    "Result not persisted"
                );
                return (PersistHandle::failed(err), barrier);
            }
        };

        let adapter = self.clone();
        let task = runtime.spawn(async move {
            if let Some(earlier) = after {
                earlier.wait().await;
                debug!(
                    submission_id = %row.submission_id,
                    "Earlier write settled; writing newer row"
                );
            }
            let result = adapter.persist(row).await;
            let _ = done.send(());
            result
        });
        (PersistHandle::spawned(task), barrier)
    }
}

/// Settles when a background write finishes, fails, or is dropped.
#[derive(Debug)]
pub struct WriteBarrier(oneshot::Receiver<()>);

impl WriteBarrier {
    fn new() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self(rx))
    }

    pub async fn wait(self) {
        // A dropped sender (panicked or cancelled task) counts as settled.
        let _ = self.0.await;
    }
}

async fn write_row(
    store: &dyn ResultStore,
    row: &ResultRow,
    timeout: Duration,
) -> PersistResult<UpsertOutcome> {
    match tokio::time::timeout(timeout, store.upsert(row)).await {
        Ok(result) => result,
        Err(_) => Err(PersistError::Timeout(timeout)),
    }
}

fn log_outcome(store: &str, row: &ResultRow, result: &PersistResult<UpsertOutcome>) {
    match result {
        Ok(outcome) => info!(
            store,
            submission_id = %row.submission_id,
            offer_status = %row.offer_status,
            final_tier = %row.final_tier,
            ?outcome,
            "Result persisted"
        ),
        Err(e) => warn!(
            store,
            submission_id = %row.submission_id,
            retryable = e.is_retryable(),
            error = %e,
            "Result not persisted; continuing without it"
        ),
    }
}

/// Outcome of a background write.
#[derive(Debug)]
pub struct PersistHandle {
    inner: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Spawned(JoinHandle<PersistResult<UpsertOutcome>>),
    Failed(PersistError),
}

impl PersistHandle {
    fn spawned(handle: JoinHandle<PersistResult<UpsertOutcome>>) -> Self {
        Self {
            inner: HandleState::Spawned(handle),
        }
    }

    fn failed(err: PersistError) -> Self {
        Self {
            inner: HandleState::Failed(err),
        }
    }

    /// Wait for the write to finish.
    pub async fn outcome(self) -> PersistResult<UpsertOutcome> {
        match self.inner {
            HandleState::Spawned(handle) => match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(PersistError::TaskFailed(join_err.to_string())),
            },
            HandleState::Failed(err) => Err(err),
        }
    }

    /// Wait for the write and keep only a failure, as a warning for display.
    pub async fn warning(self) -> Option<PersistError> {
        self.outcome().await.err()
    }

    /// Whether the background write has finished.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            HandleState::Spawned(handle) => handle.is_finished(),
            HandleState::Failed(_) => true,
        }
    }
}
