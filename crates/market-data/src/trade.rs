//! Trade event.

use std::fmt;

use serde::{Deserialize, Serialize};

use hermes_core::{AggressorSide, InstrumentId, Price, Quantity, TradeId, ValueError, ValueResult};

/// A single executed trade reported by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeTick {
    pub instrument_id: InstrumentId,
    pub price: Price,
    pub size: Quantity,
    /// The side that crossed the spread; `None` when the venue does not say.
    pub aggressor: AggressorSide,
    pub trade_id: TradeId,
    /// Venue event time in nanoseconds since the UNIX epoch.
    pub ts_event: u64,
    /// Local ingestion time in nanoseconds since the UNIX epoch.
    pub ts_init: u64,
}

impl TradeTick {
    pub fn new(
        instrument_id: InstrumentId,
        price: Price,
        size: Quantity,
        aggressor: AggressorSide,
        trade_id: TradeId,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        if size.is_zero() {
            return Err(ValueError::Validation(
                "trade size must be positive".to_string(),
            ));
        }
        if ts_init < ts_event {
            return Err(ValueError::Validation(format!(
                "ts_init {ts_init} earlier than ts_event {ts_event}"
            )));
        }
        Ok(Self {
            instrument_id,
            price,
            size,
            aggressor,
            trade_id,
            ts_event,
            ts_init,
        })
    }
}

impl fmt::Display for TradeTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} {} id={} ts={}",
            self.instrument_id, self.size, self.price, self.aggressor, self.trade_id, self.ts_event
        )
    }
}
