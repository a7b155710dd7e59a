//! Order book errors.

use thiserror::Error;

use hermes_core::{BookType, Price};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("duplicate order id: {0}")]
    DuplicateOrderId(u64),

    #[error("unknown order id: {0}")]
    UnknownOrderId(u64),

    #[error("stale delta: sequence {sequence} <= last applied {last}")]
    StaleDelta { sequence: u64, last: u64 },

    #[error("book crossed: bid {bid} >= ask {ask}")]
    CrossedBook { bid: Price, ask: Price },

    #[error("operation not supported on {book_type} book")]
    BookTypeMismatch { book_type: BookType },

    #[error("order side must be BUY or SELL")]
    UnspecifiedSide,

    #[error("delta for {delta} applied to book for {book}")]
    InstrumentMismatch { delta: String, book: String },

    #[error("arithmetic overflow aggregating level volume")]
    Overflow,

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("book is poisoned and must be rebuilt")]
    Poisoned,
}

pub type BookResult<T> = std::result::Result<T, BookError>;
