use thiserror::Error;

use crate::model::{ComparisonError, SessionStateError, SummaryError};

/// Umbrella error for the domain model.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}
