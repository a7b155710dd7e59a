//! Aggregation errors.

use thiserror::Error;

use hermes_core::ValueError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("aggregators only emit INTERNAL bars, got bar type {0}")]
    ExternalBarType(String),

    #[error("bar type {bar_type} cannot drive {expected} aggregation")]
    AggregationMismatch { bar_type: String, expected: String },

    #[error("no ticks accumulated, nothing to build")]
    EmptyBuilder,

    #[error(transparent)]
    Value(#[from] ValueError),
}

pub type AggregationResult<T> = std::result::Result<T, AggregationError>;
