//! Pipeline orchestration for SheetWriter.
//!
//! This crate ties the spreadsheet store, the language-model client and the
//! notifier together into end-to-end workflows (`run_pipeline`, `run_check`) and validates startup
//! configuration (`preflight`).

pub mod check;
pub mod pipeline;
pub mod preflight;
pub mod timestamp;
