//! SQL for the results table.

use funnel_core::ResultRow;

/// Postgres column types, in `ResultRow::COLUMNS` order.
pub const COLUMN_TYPES: [(&str, &str); 26] = [
    ("submission_id", "UUID PRIMARY KEY"),
    ("email", "TEXT NOT NULL"),
    ("first_name", "TEXT"),
    ("utm_source", "TEXT"),
    ("utm_medium", "TEXT"),
    ("utm_campaign", "TEXT"),
    ("utm_term", "TEXT"),
    ("utm_content", "TEXT"),
    ("age_range", "TEXT NOT NULL"),
    ("gender", "TEXT NOT NULL"),
    ("sleep_hours", "BIGINT NOT NULL"),
    ("exercise_days", "BIGINT NOT NULL"),
    ("stress_level", "BIGINT NOT NULL"),
    ("diet_quality", "TEXT NOT NULL"),
    ("energy_level", "BIGINT NOT NULL"),
    ("symptoms", "TEXT[] NOT NULL"),
    ("score", "SMALLINT NOT NULL CHECK (score BETWEEN 0 AND 100)"),
    ("category", "TEXT NOT NULL"),
    ("risk_level", "TEXT NOT NULL"),
    ("recommended_tier", "TEXT NOT NULL"),
    ("offer_status", "TEXT NOT NULL"),
    ("final_tier", "TEXT NOT NULL"),
    ("declines", "INTEGER NOT NULL DEFAULT 0"),
    ("skipped_to_free", "BOOLEAN NOT NULL DEFAULT FALSE"),
    ("submitted_at", "TIMESTAMPTZ NOT NULL"),
    ("updated_at", "TIMESTAMPTZ NOT NULL"),
];

/// `CREATE TABLE` plus an email index. Idempotent.
///
/// `table` must already be validated (see `FunnelConfig::validate`); it is
/// interpolated as an identifier.
pub fn create_table_sql(table: &str) -> String {
    let columns = COLUMN_TYPES
        .iter()
        .map(|(name, ty)| format!("    {:<17}{}", name, ty))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n);\n\
         CREATE INDEX IF NOT EXISTS {table}_email_idx ON {table} (email);\n"
    )
}

/// Upsert keyed on `submission_id`. Returns one row (`inserted` = whether the
/// row is new) unless a later write is already stored, in which case no row
/// comes back.
pub fn upsert_sql(table: &str) -> String {
    let columns = ResultRow::COLUMNS.join(", ");
    let placeholders = (1..=ResultRow::COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = ResultRow::COLUMNS
        .iter()
        .filter(|c| **c != "submission_id")
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT (submission_id) DO UPDATE SET {updates} \
         WHERE {table}.updated_at <= EXCLUDED.updated_at \
         RETURNING (xmax = 0) AS inserted"
    )
}
