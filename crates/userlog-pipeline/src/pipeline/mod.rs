//! The two-stage user synthesis pipeline.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration and its validated form.
//! - [`telemetry`] - log subscriber setup and optional OpenTelemetry metrics.
//! - [`barrier`] - the completion barrier the caller waits on.
//! - [`source`] - the job source feeding the job queue.
//! - [`pool`] - worker pools for the generation and persistence stages.
//! - [`service`] - [`service::Pipeline`], which wires the stages into a run.

pub mod barrier;
pub mod config;
pub mod pool;
pub mod service;
pub mod source;
pub mod telemetry;

#[cfg(test)]
mod tests;
