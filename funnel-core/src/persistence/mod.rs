//! Result persistence: the flattened row, the store seam, and the
//! non-blocking adapter.

pub mod adapter;
pub mod error;
pub mod row;
pub mod store;

pub use adapter::{PersistHandle, PersistenceAdapter, WriteBarrier, DEFAULT_PERSIST_TIMEOUT};
pub use error::{PersistError, PersistResult};
pub use row::ResultRow;
pub use store::{MemoryResultStore, ResultStore, UpsertOutcome};
