//! Error taxonomy crossing the engine boundary.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::DeductionId;

/// Shown instead of internal detail when a configuration row is missing.
pub const MSG_GENERAL_ERROR: &str = "Sorry for the inconvenience, unavailable at this time";
/// Shown instead of internal detail for any unexpected failure.
pub const MSG_UNEXPECTED_ERROR: &str = "Unexpected error occurred";

/// Every rule violation found in one request, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationError(Vec<String>);

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// `Ok(())` when no rule was violated, otherwise the composite error.
    pub fn check(messages: Vec<String>) -> Result<(), Self> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self(messages))
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// Prefixes every message, e.g. with the CSV row it came from.
    pub fn prefixed(
        self,
        prefix: &str,
    ) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|message| format!("{prefix}: {message}"))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    /// Caller-supplied data broke one or more rules.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A deduction configuration row is missing from the store.
    #[error("{0} allowance config not found")]
    ConfigNotFound(DeductionId),

    /// An administrative update touched no row.
    #[error("update of {0} allowance affected no rows")]
    UpdateFailed(DeductionId),

    /// Any other internal failure; the detail is for logs only.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl TaxError {
    /// Wraps a store failure while reading or writing `id`. A missing row is
    /// a deployment problem; everything else is opaque to the caller.
    pub fn from_repository(
        id: DeductionId,
        err: RepositoryError,
    ) -> Self {
        match err {
            RepositoryError::NotFound => Self::ConfigNotFound(id),
            other => Self::Unexpected(other.to_string()),
        }
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::ConfigNotFound(_) => 500,
            Self::UpdateFailed(_) => 422,
            Self::Unexpected(_) => 500,
        }
    }

    /// Text that is safe to return to the caller. Only validation messages
    /// are passed through verbatim.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::ConfigNotFound(_) => MSG_GENERAL_ERROR.to_string(),
            Self::UpdateFailed(id) => format!("Update {} failed", id.label()),
            Self::Unexpected(_) => MSG_UNEXPECTED_ERROR.to_string(),
        }
    }
}
