//! Order book delta event.

use std::fmt;

use serde::{Deserialize, Serialize};

use hermes_core::{BookAction, InstrumentId, ValueError, ValueResult};

use crate::order::BookOrder;

/// One incremental change to an order book.
///
/// Every action except `Clear` carries the affected order. Producers must
/// number deltas with a per-subscription monotonic `sequence`; the engine
/// rejects anything at or below the last applied number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBookDelta {
    pub instrument_id: InstrumentId,
    pub action: BookAction,
    pub order: Option<BookOrder>,
    pub sequence: u64,
    /// Venue event time in nanoseconds since the UNIX epoch.
    pub ts_event: u64,
    /// Local ingestion time in nanoseconds since the UNIX epoch.
    pub ts_init: u64,
}

impl OrderBookDelta {
    pub fn new(
        instrument_id: InstrumentId,
        action: BookAction,
        order: Option<BookOrder>,
        sequence: u64,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        if order.is_none() && action != BookAction::Clear {
            return Err(ValueError::Validation(format!(
                "{action} delta requires an order"
            )));
        }
        if ts_init < ts_event {
            return Err(ValueError::Validation(format!(
                "ts_init {ts_init} earlier than ts_event {ts_event}"
            )));
        }
        Ok(Self {
            instrument_id,
            action,
            order,
            sequence,
            ts_event,
            ts_init,
        })
    }

    pub fn add(
        instrument_id: InstrumentId,
        order: BookOrder,
        sequence: u64,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        Self::new(
            instrument_id,
            BookAction::Add,
            Some(order),
            sequence,
            ts_event,
            ts_init,
        )
    }

    pub fn update(
        instrument_id: InstrumentId,
        order: BookOrder,
        sequence: u64,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        Self::new(
            instrument_id,
            BookAction::Update,
            Some(order),
            sequence,
            ts_event,
            ts_init,
        )
    }

    pub fn delete(
        instrument_id: InstrumentId,
        order: BookOrder,
        sequence: u64,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        Self::new(
            instrument_id,
            BookAction::Delete,
            Some(order),
            sequence,
            ts_event,
            ts_init,
        )
    }

    pub fn clear(
        instrument_id: InstrumentId,
        sequence: u64,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        Self::new(
            instrument_id,
            BookAction::Clear,
            None,
            sequence,
            ts_event,
            ts_init,
        )
    }
}

impl fmt::Display for OrderBookDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.order {
            Some(order) => write!(
                f,
                "{} {} {} seq={}",
                self.instrument_id, self.action, order, self.sequence
            ),
            None => write!(
                f,
                "{} {} seq={}",
                self.instrument_id, self.action, self.sequence
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use hermes_core::OrderSide;

    use super::*;

    fn instrument() -> InstrumentId {
        "ETHUSDT.BINANCE".parse().unwrap()
    }

    fn order() -> BookOrder {
        BookOrder::new(
            OrderSide::Buy,
            "2000.00".parse().unwrap(),
            "1.5".parse().unwrap(),
            11,
        )
    }

    #[test]
    fn test_constructors() {
        let add = OrderBookDelta::add(instrument(), order(), 1, 10, 11).unwrap();
        assert_eq!(add.action, BookAction::Add);
        assert!(add.order.is_some());

        let clear = OrderBookDelta::clear(instrument(), 2, 10, 11).unwrap();
        assert_eq!(clear.action, BookAction::Clear);
        assert!(clear.order.is_none());
    }

    #[test]
    fn test_non_clear_requires_order() {
        let result = OrderBookDelta::new(instrument(), BookAction::Delete, None, 1, 0, 0);
        assert!(matches!(result, Err(ValueError::Validation(_))));
    }

    #[test]
    fn test_serde_round_trip() {
        let delta = OrderBookDelta::update(instrument(), order(), 9, 100, 110).unwrap();
        let json = serde_json::to_string(&delta).unwrap();
        let back: OrderBookDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, delta);
    }
}
