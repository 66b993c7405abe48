#![doc = include_str!("../README.md")]

mod common;
mod storage;
mod synth;

pub use common::*;
pub use storage::{ReportWriter, prepare_output_dir};
pub use synth::*;
