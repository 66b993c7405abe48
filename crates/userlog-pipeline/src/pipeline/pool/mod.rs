//! Worker pools for both pipeline stages.
//!
//! - [`manager`] - spawning, supervising and joining a fixed set of workers.
//! - [`generator`] - the generation worker loop (jobs -> user records).
//! - [`persister`] - the persistence worker loop (user records -> reports).

pub mod generator;
pub mod manager;
pub mod persister;
