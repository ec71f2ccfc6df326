//! Scheduling intent resolution and storage

mod resolver;
mod store;

pub use resolver::{scheduling_intents_for, IntentResolver, ResolutionSummary, PAUSE_COMMAND};
pub use store::{intent_key, IntentStore, KeyedStore};
