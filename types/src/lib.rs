//! Core domain types for Cutoff.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod ids;
mod outcome;
mod report;

pub use ids::RecordIndex;
pub use outcome::{CancelReason, OperationKind, Outcome};
pub use report::{BatchReport, BatchStop, RecordReport, RecordSettlement};
