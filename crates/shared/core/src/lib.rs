//! Hermes Core Domain
//!
//! Pure domain types for the Hermes trading system: fixed-precision values,
//! currencies, interned identifiers and the wire-stable enumerations.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod enums;
pub mod errors;
pub mod identifiers;
pub mod values;

// Re-export commonly used types at crate root
pub use enums::{
    AggregationSource, AggressorSide, BarAggregation, BookAction, BookType, CurrencyKind,
    OrderSide, PriceType,
};
pub use errors::{IdentifierError, ValueError, ValueResult};
pub use identifiers::{
    AccountId, ClientOrderId, InstrumentId, PositionId, StrategyId, Symbol, TradeId, TraderId,
    Venue, VenueOrderId,
};
pub use values::{Currency, Money, Price, Quantity, FIXED_PRECISION, FIXED_SCALAR};
