//! Tagged union over the market-data event types.

use serde::{Deserialize, Serialize};

use hermes_core::InstrumentId;

use crate::{Bar, OrderBookDelta, QuoteTick, TradeTick};

/// A closed sum over every event the data stream can carry.
///
/// Wire and persistence code dispatches on this tag; trait-object dispatch
/// is reserved for consumers that genuinely vary per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataEvent {
    Quote(QuoteTick),
    Trade(TradeTick),
    Bar(Bar),
    Delta(OrderBookDelta),
}

impl DataEvent {
    pub fn instrument_id(&self) -> &InstrumentId {
        match self {
            DataEvent::Quote(quote) => &quote.instrument_id,
            DataEvent::Trade(trade) => &trade.instrument_id,
            DataEvent::Bar(bar) => &bar.bar_type.instrument_id,
            DataEvent::Delta(delta) => &delta.instrument_id,
        }
    }

    pub fn ts_event(&self) -> u64 {
        match self {
            DataEvent::Quote(quote) => quote.ts_event,
            DataEvent::Trade(trade) => trade.ts_event,
            DataEvent::Bar(bar) => bar.ts_event,
            DataEvent::Delta(delta) => delta.ts_event,
        }
    }

    pub fn ts_init(&self) -> u64 {
        match self {
            DataEvent::Quote(quote) => quote.ts_init,
            DataEvent::Trade(trade) => trade.ts_init,
            DataEvent::Bar(bar) => bar.ts_init,
            DataEvent::Delta(delta) => delta.ts_init,
        }
    }
}

impl From<QuoteTick> for DataEvent {
    fn from(quote: QuoteTick) -> Self {
        DataEvent::Quote(quote)
    }
}

impl From<TradeTick> for DataEvent {
    fn from(trade: TradeTick) -> Self {
        DataEvent::Trade(trade)
    }
}

impl From<Bar> for DataEvent {
    fn from(bar: Bar) -> Self {
        DataEvent::Bar(bar)
    }
}

impl From<OrderBookDelta> for DataEvent {
    fn from(delta: OrderBookDelta) -> Self {
        DataEvent::Delta(delta)
    }
}
