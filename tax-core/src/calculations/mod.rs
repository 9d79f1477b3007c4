//! Tax calculation stages: deductions, progressive brackets and
//! withholding-tax settlement.
//!
//! Each stage is usable on its own; [`crate::service::TaxService`] chains
//! them into the full pipeline.

pub mod brackets;
pub mod common;
pub mod deductions;
pub mod settlement;

pub use brackets::{BracketBreakdown, BracketTable, BracketTableError};
pub use deductions::DeductionPipeline;
pub use settlement::{Settlement, settle};
