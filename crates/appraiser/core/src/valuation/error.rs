use crate::env::{CatalogError, TableError};
use crate::error::{AppraisalError, ErrorSeverity};

/// Errors returned by the valuation engine.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValuationError {
    /// A Monte Carlo estimate needs at least one trial.
    #[error("valuation requires at least one iteration")]
    ZeroIterations,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl AppraisalError for ValuationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ValuationError::ZeroIterations => ErrorSeverity::Validation,
            ValuationError::Catalog(err) => err.severity(),
            ValuationError::Table(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ValuationError::ZeroIterations => "VALUATION_ZERO_ITERATIONS",
            ValuationError::Catalog(err) => err.error_code(),
            ValuationError::Table(err) => err.error_code(),
        }
    }
}
