//! Hermes Order Book
//!
//! A limit order book engine handling L1/L2/L3 data: two price-ordered
//! ladders of FIFO levels with an order-id index for O(1) updates, driven
//! by a stream of book deltas. One owner applies deltas in sequence order;
//! every operation is bounded and non-blocking.

pub mod analysis;
pub mod book;
pub mod error;
pub mod ladder;
pub mod level;
pub mod price;

// Re-exports
pub use book::{LevelSnapshot, OrderBook};
pub use error::{BookError, BookResult};
pub use ladder::Ladder;
pub use level::Level;
pub use price::BookPrice;
