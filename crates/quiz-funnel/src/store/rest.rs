//! PostgREST-compatible HTTP results store.
//!
//! Rows are POSTed to `{base_url}/{table}?on_conflict=submission_id` with
//! `Prefer: resolution=merge-duplicates`, which PostgREST turns into an
//! `INSERT ... ON CONFLICT DO UPDATE`. The HTTP API cannot express the
//! `updated_at` guard, so this store is plain last-write-wins.

use std::time::Duration;

use async_trait::async_trait;
use funnel_core::persistence::PersistResult;
use funnel_core::{PersistError, ResultRow, ResultStore, UpsertOutcome};
use reqwest::header::{HeaderValue, CONTENT_TYPE};

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Longest response body kept in a rejection message.
const MAX_ERROR_BODY: usize = 512;

pub struct RestResultStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestResultStore {
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: Option<String>,
        connect_timeout: Duration,
    ) -> PersistResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| PersistError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(http, base_url, table, api_key))
    }

    /// Use a preconfigured client (proxy, TLS roots, ...).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        table: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), table),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The upsert request for `row`, without sending it.
    pub fn build_request(&self, row: &ResultRow) -> PersistResult<reqwest::Request> {
        let body = serde_json::to_vec(std::slice::from_ref(row))?;

        let mut builder = self
            .http
            .post(&self.endpoint)
            .query(&[("on_conflict", "submission_id")])
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("Prefer", PREFER_UPSERT)
            .body(body);
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key).bearer_auth(key);
        }

        builder
            .build()
            .map_err(|e| PersistError::Query(format!("Invalid request: {}", e)))
    }
}

#[async_trait]
impl ResultStore for RestResultStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn upsert(&self, row: &ResultRow) -> PersistResult<UpsertOutcome> {
        let request = self.build_request(row)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(UpsertOutcome::Written);
        }

        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("no body").to_string();
        }
        Err(PersistError::rejected(status.as_u16(), message))
    }
}
