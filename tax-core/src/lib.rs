//! Personal income tax engine.
//!
//! [`TaxService`] validates a [`TaxRequest`], subtracts the personal and
//! itemized allowances, applies the progressive [`BracketTable`] and settles
//! the result against withheld tax. Deduction amounts live behind the
//! [`DeductionRepository`] trait so any store can back them.

pub mod calculations;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod validation;

pub use calculations::BracketTable;
pub use db::{DeductionRepository, RepositoryError};
pub use error::{TaxError, ValidationError};
pub use models::*;
pub use service::TaxService;
