//! Flat row projections of the event types.
//!
//! These structs are the persistence contract: field order and types are
//! the on-disk column order and any change is a breaking format revision.
//! Raw values travel as scaled integers with their precision bytes beside
//! them; identifiers travel as strings. Reading back goes through the typed
//! constructors so a corrupt row cannot produce an invalid event.

use serde::{Deserialize, Serialize};

use hermes_core::{
    AggressorSide, BookAction, InstrumentId, OrderSide, Price, Quantity, TradeId, ValueError,
    ValueResult,
};

use crate::{Bar, BarType, BookOrder, OrderBookDelta, QuoteTick, TradeTick};

/// Columnar form of [`QuoteTick`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTickRow {
    pub instrument_id: String,
    pub bid_raw: i64,
    pub ask_raw: i64,
    pub bid_prec: u8,
    pub ask_prec: u8,
    pub bid_size_raw: u64,
    pub ask_size_raw: u64,
    pub bsz_prec: u8,
    pub asz_prec: u8,
    pub ts_event: u64,
    pub ts_init: u64,
}

impl From<&QuoteTick> for QuoteTickRow {
    fn from(quote: &QuoteTick) -> Self {
        Self {
            instrument_id: quote.instrument_id.to_string(),
            bid_raw: quote.bid.raw(),
            ask_raw: quote.ask.raw(),
            bid_prec: quote.bid.precision(),
            ask_prec: quote.ask.precision(),
            bid_size_raw: quote.bid_size.raw(),
            ask_size_raw: quote.ask_size.raw(),
            bsz_prec: quote.bid_size.precision(),
            asz_prec: quote.ask_size.precision(),
            ts_event: quote.ts_event,
            ts_init: quote.ts_init,
        }
    }
}

impl TryFrom<&QuoteTickRow> for QuoteTick {
    type Error = ValueError;

    fn try_from(row: &QuoteTickRow) -> ValueResult<Self> {
        let instrument_id: InstrumentId = row.instrument_id.parse()?;
        QuoteTick::new(
            instrument_id,
            Price::from_raw(row.bid_raw, row.bid_prec)?,
            Price::from_raw(row.ask_raw, row.ask_prec)?,
            Quantity::from_raw(row.bid_size_raw, row.bsz_prec)?,
            Quantity::from_raw(row.ask_size_raw, row.asz_prec)?,
            row.ts_event,
            row.ts_init,
        )
    }
}

/// Columnar form of [`TradeTick`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTickRow {
    pub instrument_id: String,
    pub price_raw: i64,
    pub price_prec: u8,
    pub size_raw: u64,
    pub size_prec: u8,
    pub aggressor: u8,
    pub trade_id: String,
    pub ts_event: u64,
    pub ts_init: u64,
}

impl From<&TradeTick> for TradeTickRow {
    fn from(trade: &TradeTick) -> Self {
        Self {
            instrument_id: trade.instrument_id.to_string(),
            price_raw: trade.price.raw(),
            price_prec: trade.price.precision(),
            size_raw: trade.size.raw(),
            size_prec: trade.size.precision(),
            aggressor: trade.aggressor as u8,
            trade_id: trade.trade_id.to_string(),
            ts_event: trade.ts_event,
            ts_init: trade.ts_init,
        }
    }
}

impl TryFrom<&TradeTickRow> for TradeTick {
    type Error = ValueError;

    fn try_from(row: &TradeTickRow) -> ValueResult<Self> {
        let instrument_id: InstrumentId = row.instrument_id.parse()?;
        let trade_id = TradeId::new(&row.trade_id)?;
        TradeTick::new(
            instrument_id,
            Price::from_raw(row.price_raw, row.price_prec)?,
            Quantity::from_raw(row.size_raw, row.size_prec)?,
            AggressorSide::try_from(row.aggressor)?,
            trade_id,
            row.ts_event,
            row.ts_init,
        )
    }
}

/// Columnar form of [`Bar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarRow {
    pub bar_type: String,
    pub open_raw: i64,
    pub high_raw: i64,
    pub low_raw: i64,
    pub close_raw: i64,
    pub open_prec: u8,
    pub high_prec: u8,
    pub low_prec: u8,
    pub close_prec: u8,
    pub volume_raw: u64,
    pub volume_prec: u8,
    pub ts_event: u64,
    pub ts_init: u64,
}

impl From<&Bar> for BarRow {
    fn from(bar: &Bar) -> Self {
        Self {
            bar_type: bar.bar_type.to_string(),
            open_raw: bar.open.raw(),
            high_raw: bar.high.raw(),
            low_raw: bar.low.raw(),
            close_raw: bar.close.raw(),
            open_prec: bar.open.precision(),
            high_prec: bar.high.precision(),
            low_prec: bar.low.precision(),
            close_prec: bar.close.precision(),
            volume_raw: bar.volume.raw(),
            volume_prec: bar.volume.precision(),
            ts_event: bar.ts_event,
            ts_init: bar.ts_init,
        }
    }
}

impl TryFrom<&BarRow> for Bar {
    type Error = ValueError;

    fn try_from(row: &BarRow) -> ValueResult<Self> {
        let bar_type: BarType = row.bar_type.parse()?;
        Bar::new(
            bar_type,
            Price::from_raw(row.open_raw, row.open_prec)?,
            Price::from_raw(row.high_raw, row.high_prec)?,
            Price::from_raw(row.low_raw, row.low_prec)?,
            Price::from_raw(row.close_raw, row.close_prec)?,
            Quantity::from_raw(row.volume_raw, row.volume_prec)?,
            row.ts_event,
            row.ts_init,
        )
    }
}

/// Columnar form of [`OrderBookDelta`].
///
/// `Clear` rows carry `side = 0` and zeroed order columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookDeltaRow {
    pub instrument_id: String,
    pub action: u8,
    pub side: u8,
    pub price_raw: i64,
    pub price_prec: u8,
    pub size_raw: u64,
    pub size_prec: u8,
    pub order_id: u64,
    pub sequence: u64,
    pub ts_event: u64,
    pub ts_init: u64,
}

impl From<&OrderBookDelta> for OrderBookDeltaRow {
    fn from(delta: &OrderBookDelta) -> Self {
        let (side, price_raw, price_prec, size_raw, size_prec, order_id) = match &delta.order {
            Some(order) => (
                order.side as u8,
                order.price.raw(),
                order.price.precision(),
                order.size.raw(),
                order.size.precision(),
                order.order_id,
            ),
            None => (OrderSide::NoOrderSide as u8, 0, 0, 0, 0, 0),
        };
        Self {
            instrument_id: delta.instrument_id.to_string(),
            action: delta.action as u8,
            side,
            price_raw,
            price_prec,
            size_raw,
            size_prec,
            order_id,
            sequence: delta.sequence,
            ts_event: delta.ts_event,
            ts_init: delta.ts_init,
        }
    }
}

impl TryFrom<&OrderBookDeltaRow> for OrderBookDelta {
    type Error = ValueError;

    fn try_from(row: &OrderBookDeltaRow) -> ValueResult<Self> {
        let instrument_id: InstrumentId = row.instrument_id.parse()?;
        let action = BookAction::try_from(row.action)?;
        let order = if action == BookAction::Clear {
            None
        } else {
            Some(BookOrder::new(
                OrderSide::try_from(row.side)?,
                Price::from_raw(row.price_raw, row.price_prec)?,
                Quantity::from_raw(row.size_raw, row.size_prec)?,
                row.order_id,
            ))
        };
        OrderBookDelta::new(
            instrument_id,
            action,
            order,
            row.sequence,
            row.ts_event,
            row.ts_init,
        )
    }
}

#[cfg(test)]
mod tests {
    use hermes_core::{AggregationSource, BarAggregation, PriceType};

    use super::*;
    use crate::BarSpecification;

    #[test]
    fn test_quote_row_round_trip() {
        let quote = QuoteTick::new(
            "EURUSD.SIM".parse().unwrap(),
            "1.2344".parse().unwrap(),
            "1.2346".parse().unwrap(),
            "100000".parse().unwrap(),
            "150000".parse().unwrap(),
            1_000,
            1_200,
        )
        .unwrap();
        let row = QuoteTickRow::from(&quote);
        assert_eq!(row.bid_raw, 1_234_400_000);
        assert_eq!(row.bid_prec, 4);
        let back = QuoteTick::try_from(&row).unwrap();
        assert_eq!(back, quote);
    }

    #[test]
    fn test_trade_row_round_trip() {
        let trade = TradeTick::new(
            "BTCUSDT.BINANCE".parse().unwrap(),
            "50000.00".parse().unwrap(),
            "0.25".parse().unwrap(),
            AggressorSide::Buyer,
            TradeId::new("T-77").unwrap(),
            5,
            6,
        )
        .unwrap();
        let row = TradeTickRow::from(&trade);
        assert_eq!(row.aggressor, 1);
        let back = TradeTick::try_from(&row).unwrap();
        assert_eq!(back, trade);
    }

    #[test]
    fn test_bar_row_round_trip() {
        let bar_type = BarType::new(
            "BTCUSDT.BINANCE".parse().unwrap(),
            BarSpecification::new(1, BarAggregation::Minute, PriceType::Last).unwrap(),
            AggregationSource::External,
        );
        let bar = Bar::new(
            bar_type,
            "10.0".parse().unwrap(),
            "12.0".parse().unwrap(),
            "9.0".parse().unwrap(),
            "11.0".parse().unwrap(),
            "42".parse().unwrap(),
            60_000,
            60_500,
        )
        .unwrap();
        let row = BarRow::from(&bar);
        let back = Bar::try_from(&row).unwrap();
        assert_eq!(back, bar);
    }

    #[test]
    fn test_delta_row_round_trip() {
        let delta = OrderBookDelta::add(
            "ETHUSDT.BINANCE".parse().unwrap(),
            BookOrder::new(
                OrderSide::Sell,
                "2001.5".parse().unwrap(),
                "3".parse().unwrap(),
                99,
            ),
            17,
            100,
            105,
        )
        .unwrap();
        let row = OrderBookDeltaRow::from(&delta);
        assert_eq!(row.action, BookAction::Add as u8);
        assert_eq!(row.side, OrderSide::Sell as u8);
        let back = OrderBookDelta::try_from(&row).unwrap();
        assert_eq!(back, delta);
    }

    #[test]
    fn test_clear_row_has_no_order() {
        let delta =
            OrderBookDelta::clear("ETHUSDT.BINANCE".parse().unwrap(), 18, 100, 105).unwrap();
        let row = OrderBookDeltaRow::from(&delta);
        assert_eq!(row.side, 0);
        assert_eq!(row.order_id, 0);
        let back = OrderBookDelta::try_from(&row).unwrap();
        assert_eq!(back, delta);
    }

    #[test]
    fn test_corrupt_row_is_rejected() {
        let mut row = QuoteTickRow::from(
            &QuoteTick::new(
                "EURUSD.SIM".parse().unwrap(),
                "1.10".parse().unwrap(),
                "1.11".parse().unwrap(),
                "1".parse().unwrap(),
                "1".parse().unwrap(),
                1,
                1,
            )
            .unwrap(),
        );
        row.bid_raw = row.ask_raw + 1;
        assert!(QuoteTick::try_from(&row).is_err());
    }

    #[test]
    fn test_column_order_is_stable() {
        // serialized field order is the on-disk format
        let quote = QuoteTick::new(
            "EURUSD.SIM".parse().unwrap(),
            "1.10".parse().unwrap(),
            "1.11".parse().unwrap(),
            "1".parse().unwrap(),
            "1".parse().unwrap(),
            1,
            1,
        )
        .unwrap();
        let row = QuoteTickRow::from(&quote);
        let json = serde_json::to_string(&row).unwrap();
        let keys: Vec<&str> = json
            .trim_matches(|c| c == '{' || c == '}')
            .split(',')
            .map(|kv| kv.split(':').next().unwrap_or("").trim_matches('"'))
            .collect();
        assert_eq!(
            keys,
            vec![
                "instrument_id",
                "bid_raw",
                "ask_raw",
                "bid_prec",
                "ask_prec",
                "bid_size_raw",
                "ask_size_raw",
                "bsz_prec",
                "asz_prec",
                "ts_event",
                "ts_init",
            ]
        );
    }
}
