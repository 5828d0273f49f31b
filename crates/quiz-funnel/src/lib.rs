//! Quiz funnel runner.
//!
//! Wires [`funnel_core`] to the outside world:
//! - Layered configuration (defaults → TOML → `FUNNEL_*` env)
//! - PostgreSQL and PostgREST results stores
//! - Tracing setup and plain-text offer rendering
//! - The `quiz-funnel` CLI

pub mod cli;
pub mod config;
pub mod presenter;
pub mod store;
pub mod telemetry;
