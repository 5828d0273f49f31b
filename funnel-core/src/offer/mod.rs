//! Tiered offers: tiers, catalog, and the decline state machine.

pub mod catalog;
pub mod state_machine;
pub mod tier;

pub use catalog::{OfferCatalog, OfferView};
pub use state_machine::{OfferEvent, OfferState, TransitionRecord};
pub use tier::{Tier, UnknownTier};
