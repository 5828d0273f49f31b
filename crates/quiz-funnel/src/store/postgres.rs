//! PostgreSQL results store over `tokio-postgres`.

use async_trait::async_trait;
use funnel_core::persistence::PersistResult;
use funnel_core::{PersistError, ResultRow, ResultStore, UpsertOutcome};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use super::schema::{create_table_sql, upsert_sql};

pub struct PgResultStore {
    client: Client,
    table: String,
    upsert_sql: String,
}

impl PgResultStore {
    /// Connect and start driving the connection in the background.
    ///
    /// `table` must already be validated; it is interpolated into SQL.
    pub async fn connect(database_url: &str, table: &str) -> PersistResult<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(map_pg_error)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "Postgres connection closed with error");
            }
        });

        debug!(table, "Connected to Postgres results store");
        Ok(Self {
            client,
            table: table.to_string(),
            upsert_sql: upsert_sql(table),
        })
    }

    /// Create the results table and index if missing.
    pub async fn ensure_schema(&self) -> PersistResult<()> {
        self.client
            .batch_execute(&create_table_sql(&self.table))
            .await
            .map_err(map_pg_error)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn upsert(&self, row: &ResultRow) -> PersistResult<UpsertOutcome> {
        let params: [&(dyn ToSql + Sync); 26] = [
            &row.submission_id,
            &row.email,
            &row.first_name,
            &row.utm_source,
            &row.utm_medium,
            &row.utm_campaign,
            &row.utm_term,
            &row.utm_content,
            &row.age_range,
            &row.gender,
            &row.sleep_hours,
            &row.exercise_days,
            &row.stress_level,
            &row.diet_quality,
            &row.energy_level,
            &row.symptoms,
            &row.score,
            &row.category,
            &row.risk_level,
            &row.recommended_tier,
            &row.offer_status,
            &row.final_tier,
            &row.declines,
            &row.skipped_to_free,
            &row.submitted_at,
            &row.updated_at,
        ];

        let returned = self
            .client
            .query_opt(self.upsert_sql.as_str(), &params)
            .await
            .map_err(map_pg_error)?;

        match returned {
            None => Ok(UpsertOutcome::Stale),
            Some(r) => {
                let inserted: bool = r.try_get("inserted").map_err(map_pg_error)?;
                Ok(if inserted {
                    UpsertOutcome::Inserted
                } else {
                    UpsertOutcome::Updated
                })
            }
        }
    }
}

/// Server-side errors mean the statement was refused; anything else is a
/// connection problem.
fn map_pg_error(e: tokio_postgres::Error) -> PersistError {
    match e.as_db_error() {
        Some(db) => PersistError::Query(format!("{} ({})", db.message(), db.code().code())),
        None if e.is_closed() => PersistError::Connection("connection closed".into()),
        None => PersistError::Connection(e.to_string()),
    }
}
