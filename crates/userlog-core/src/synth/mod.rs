//! Randomized activity log synthesis.
//!
//! The synthesizer is parameterized over a [`RandSource`] and a
//! [`TimeSource`] so that pipeline workers can each own an independent
//! generator while tests plug in deterministic mocks.

mod activity;
mod interface;
mod random;

pub use activity::{ActionCatalog, ActivitySynthesizer, DEFAULT_ACTIONS, LOG_ENTRY_LIMIT};
pub use interface::{RandSource, SystemClock, TimeSource};
pub use random::{SeededRandom, ThreadRandom};
