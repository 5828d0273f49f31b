//! The results-store seam and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::PersistResult;
use super::row::ResultRow;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The store acknowledged the write but does not say which.
    Written,
    /// A row with a later `updated_at` was already stored; nothing changed.
    Stale,
}

/// A relational results store that keeps one row per `submission_id`.
///
/// Implementations must upsert: writing a row whose `submission_id` already
/// exists replaces it. Stores that can compare timestamps skip a write whose
/// `updated_at` is older than the stored row, since background writes may
/// finish out of order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn upsert(&self, row: &ResultRow) -> PersistResult<UpsertOutcome>;
}

/// Process-local store. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultStore {
    rows: Arc<RwLock<HashMap<Uuid, ResultRow>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, submission_id: Uuid) -> Option<ResultRow> {
        self.rows.read().await.get(&submission_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// All rows, ordered by submission time.
    pub async fn rows(&self) -> Vec<ResultRow> {
        let mut rows: Vec<ResultRow> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        rows
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, row: &ResultRow) -> PersistResult<UpsertOutcome> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&row.submission_id) {
            Some(stored) if stored.updated_at > row.updated_at => Ok(UpsertOutcome::Stale),
            Some(stored) => {
                *stored = row.clone();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                rows.insert(row.submission_id, row.clone());
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::funnel::OfferOutcome;
    use crate::offer::Tier;
    use crate::scoring::ScoringEngine;
    use crate::test_support::submission_scoring_85;

    fn row(outcome: &OfferOutcome) -> ResultRow {
        let submission = submission_scoring_85();
        let result = ScoringEngine::new().score(&submission.answers);
        ResultRow::new(&submission, &result, outcome, Utc::now())
    }

    #[tokio::test]
    async fn test_memory_store_upserts_by_submission_id() {
        let store = MemoryResultStore::new();
        let first = row(&OfferOutcome::pending(Tier::Premium));

        assert_eq!(store.upsert(&first).await.unwrap(), UpsertOutcome::Inserted);

        let mut second = first.clone();
        second.final_tier = "digital".into();
        second.declines = 2;
        assert_eq!(store.upsert(&second).await.unwrap(), UpsertOutcome::Updated);

        assert_eq!(store.len().await, 1);
        let stored = store.get(first.submission_id).await.unwrap();
        assert_eq!(stored.final_tier, "digital");
        assert_eq!(stored.declines, 2);
    }

    #[tokio::test]
    async fn test_memory_store_ignores_older_write() {
        let store = MemoryResultStore::new();
        let mut newer = row(&OfferOutcome::pending(Tier::Premium));
        newer.offer_status = "accepted".into();
        let mut older = newer.clone();
        older.offer_status = "pending".into();
        older.updated_at = newer.updated_at - chrono::Duration::seconds(1);

        store.upsert(&newer).await.unwrap();
        assert_eq!(store.upsert(&older).await.unwrap(), UpsertOutcome::Stale);
        let stored = store.get(newer.submission_id).await.unwrap();
        assert_eq!(stored.offer_status, "accepted");
    }

    #[tokio::test]
    async fn test_memory_store_keeps_distinct_submissions() {
        let store = MemoryResultStore::new();
        store
            .upsert(&row(&OfferOutcome::pending(Tier::Premium)))
            .await
            .unwrap();
        store
            .upsert(&row(&OfferOutcome::pending(Tier::Premium)))
            .await
            .unwrap();
        assert_eq!(store.len().await, 2);
        assert_eq!(store.rows().await.len(), 2);
    }
}
