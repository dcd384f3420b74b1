//! Core pipeline orchestration for nbpress.
//!
//! This crate ties together the notebook filter and the external renderers
//! into the end-to-end `convert` workflow, and owns the policy for which
//! intermediate files survive a run.

pub mod pipeline;

pub use pipeline::{ConvertConfig, ConvertResult, ProgressReporter, SilentProgress, convert, strip};
