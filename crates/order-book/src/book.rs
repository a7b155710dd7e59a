//! The order book engine.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use hermes_core::{
    BookAction, BookType, InstrumentId, OrderSide, Price, Quantity, FIXED_PRECISION,
};
use market_data::{BookOrder, OrderBookDelta};

use crate::error::{BookError, BookResult};
use crate::ladder::Ladder;

/// One level of a full book snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub side: OrderSide,
    pub price: Price,
    pub orders: Vec<BookOrder>,
}

/// A limit order book for one instrument.
///
/// The same type carries L1/L2/L3 data; the [`BookType`] discriminator
/// selects the semantics. One owner applies deltas in sequence order and
/// readers see a consistent state between deltas. Operations that only
/// make sense order-by-order fail with `BookTypeMismatch` on an L1 book
/// rather than silently degrading.
#[derive(Debug, Clone)]
pub struct OrderBook {
    instrument_id: InstrumentId,
    book_type: BookType,
    bids: Ladder,
    asks: Ladder,
    last_side: OrderSide,
    last_update_id: u64,
    ts_last: u64,
    poisoned: bool,
    events: Vec<OrderBookDelta>,
}

impl OrderBook {
    pub fn new(instrument_id: InstrumentId, book_type: BookType) -> Self {
        Self {
            instrument_id,
            book_type,
            bids: Ladder::new(OrderSide::Buy),
            asks: Ladder::new(OrderSide::Sell),
            last_side: OrderSide::NoOrderSide,
            last_update_id: 0,
            ts_last: 0,
            poisoned: false,
            events: Vec::new(),
        }
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn book_type(&self) -> BookType {
        self.book_type
    }

    /// Side of the last applied order-bearing delta.
    pub fn last_side(&self) -> OrderSide {
        self.last_side
    }

    /// Sequence number of the last accepted delta.
    pub fn last_update_id(&self) -> u64 {
        self.last_update_id
    }

    /// Venue time of the last accepted delta, nanoseconds.
    pub fn ts_last(&self) -> u64 {
        self.ts_last
    }

    /// True once a fatal inconsistency was detected; the book must be
    /// rebuilt from a fresh snapshot.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Apply one delta, dispatching on its action.
    ///
    /// Deltas numbered at or below the last accepted sequence are rejected
    /// with `StaleDelta` and leave the book unchanged. A delta that trips
    /// an overflow or an index inconsistency poisons the book.
    pub fn apply(&mut self, delta: &OrderBookDelta) -> BookResult<()> {
        if self.poisoned {
            return Err(BookError::Poisoned);
        }
        if delta.instrument_id != self.instrument_id {
            return Err(BookError::InstrumentMismatch {
                delta: delta.instrument_id.to_string(),
                book: self.instrument_id.to_string(),
            });
        }
        if delta.sequence <= self.last_update_id {
            debug!(
                "rejecting stale delta for {}: sequence {} <= {}",
                self.instrument_id, delta.sequence, self.last_update_id
            );
            return Err(BookError::StaleDelta {
                sequence: delta.sequence,
                last: self.last_update_id,
            });
        }

        let result = match (delta.action, &delta.order) {
            (BookAction::Add, Some(order)) => self.add(*order),
            (BookAction::Update, Some(order)) => self.update(*order),
            (BookAction::Delete, Some(order)) => self.delete(order.side, order.order_id),
            (BookAction::Clear, _) => {
                self.clear(None);
                Ok(())
            }
            // unreachable for validated deltas
            (action, None) => Err(BookError::Integrity(format!(
                "{action} delta without an order"
            ))),
        };

        match result {
            Ok(()) => {
                self.last_update_id = delta.sequence;
                self.ts_last = self.ts_last.max(delta.ts_event);
                Ok(())
            }
            Err(err) => {
                self.poison_if_fatal(&err);
                Err(err)
            }
        }
    }

    /// Insert an order with an unseen id.
    pub fn add(&mut self, order: BookOrder) -> BookResult<()> {
        if self.poisoned {
            return Err(BookError::Poisoned);
        }
        if !order.side.is_specified() {
            return Err(BookError::UnspecifiedSide);
        }
        let result = match self.book_type {
            BookType::L1_TBBO => self.add_top_of_book(order),
            BookType::L2_MBP | BookType::L3_MBO => {
                let result = self.ladder_mut(order.side).add(order);
                if result.is_ok() {
                    self.resolve_crossed(order.side);
                }
                result
            }
        };
        if result.is_ok() {
            self.last_side = order.side;
        } else if let Err(err) = &result {
            self.poison_if_fatal(err);
        }
        result
    }

    /// Update a known order. On an L1 book only the synthetic top-of-book
    /// ids are addressable; anything else is a `BookTypeMismatch`.
    pub fn update(&mut self, order: BookOrder) -> BookResult<()> {
        if self.poisoned {
            return Err(BookError::Poisoned);
        }
        if !order.side.is_specified() {
            return Err(BookError::UnspecifiedSide);
        }
        let result = match self.book_type {
            BookType::L1_TBBO => {
                if order.order_id != synthetic_order_id(order.side) {
                    return Err(BookError::BookTypeMismatch {
                        book_type: self.book_type,
                    });
                }
                self.add_top_of_book(order)
            }
            BookType::L2_MBP | BookType::L3_MBO => {
                let result = self.ladder_mut(order.side).update(order);
                if result.is_ok() && !order.size.is_zero() {
                    self.resolve_crossed(order.side);
                }
                result
            }
        };
        if result.is_ok() {
            self.last_side = order.side;
        } else if let Err(err) = &result {
            self.poison_if_fatal(err);
        }
        result
    }

    /// Remove a known order; the emptied level is dropped.
    pub fn delete(&mut self, side: OrderSide, order_id: u64) -> BookResult<()> {
        if self.poisoned {
            return Err(BookError::Poisoned);
        }
        if !side.is_specified() {
            return Err(BookError::UnspecifiedSide);
        }
        if self.book_type == BookType::L1_TBBO && order_id != synthetic_order_id(side) {
            return Err(BookError::BookTypeMismatch {
                book_type: self.book_type,
            });
        }
        let result = self.ladder_mut(side).delete(order_id).map(|_| ());
        if result.is_ok() {
            self.last_side = side;
        } else if let Err(err) = &result {
            self.poison_if_fatal(err);
        }
        result
    }

    /// Remove all orders on one side, or on both.
    pub fn clear(&mut self, side: Option<OrderSide>) {
        match side {
            Some(OrderSide::Buy) => self.bids.clear(),
            Some(OrderSide::Sell) => self.asks.clear(),
            _ => {
                self.bids.clear();
                self.asks.clear();
            }
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    pub fn best_bid_qty(&self) -> Option<Quantity> {
        self.bids.best_volume()
    }

    pub fn best_ask_qty(&self) -> Option<Quantity> {
        self.asks.best_volume()
    }

    /// `best_ask - best_bid`, when both sides are present.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid).ok(),
            _ => None,
        }
    }

    /// Half the bid/ask sum at the wider of the two precisions.
    pub fn midpoint(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                let precision = bid.precision().max(ask.precision()).min(FIXED_PRECISION);
                let mid = (i128::from(bid.raw()) + i128::from(ask.raw())) / 2;
                Price::from_raw(mid as i64, precision).ok()
            }
            _ => None,
        }
    }

    /// The `n` best levels of one side as `(price, aggregate size)`.
    pub fn depth(&self, side: OrderSide, n: usize) -> Vec<(Price, Quantity)> {
        self.ladder(side)
            .levels()
            .take(n)
            .map(|level| (level.price.value, level.volume()))
            .collect()
    }

    /// The whole book, bids then asks, each side best to worst.
    pub fn snapshot(&self) -> Vec<LevelSnapshot> {
        let bids = self.bids.levels().map(|level| LevelSnapshot {
            side: OrderSide::Buy,
            price: level.price.value,
            orders: level.orders().to_vec(),
        });
        let asks = self.asks.levels().map(|level| LevelSnapshot {
            side: OrderSide::Sell,
            price: level.price.value,
            orders: level.orders().to_vec(),
        });
        bids.chain(asks).collect()
    }

    /// Walk the opposite side as if `taker` executed against it, returning
    /// the `(price, size)` consumed per resting order without mutating the
    /// book. Honors FIFO within levels on L3 and level aggregation on L2.
    pub fn simulate_fills(&self, taker: &BookOrder) -> Vec<(Price, Quantity)> {
        let mut fills = Vec::new();
        if !taker.side.is_specified() || taker.size.is_zero() {
            return fills;
        }
        let ladder = self.ladder(taker.side.opposite());
        let mut remaining = taker.size;
        'levels: for level in ladder.levels() {
            let crosses = match taker.side {
                OrderSide::Buy => level.price.value <= taker.price,
                _ => level.price.value >= taker.price,
            };
            if !crosses {
                break;
            }
            for resting in level.orders() {
                let take = remaining.min(resting.size);
                if !take.is_zero() {
                    fills.push((resting.price, take));
                    remaining = remaining.saturating_sub(take);
                }
                if remaining.is_zero() {
                    break 'levels;
                }
            }
        }
        fills
    }

    /// Synthetic deltas emitted as side effects (crossed-book removals)
    /// since the last drain.
    pub fn drain_events(&mut self) -> Vec<OrderBookDelta> {
        std::mem::take(&mut self.events)
    }

    /// Verify the global invariants: uncrossed (L2/L3), no empty levels,
    /// and the order-id index in bijection with the level contents.
    pub fn check_integrity(&self) -> BookResult<()> {
        if self.poisoned {
            return Err(BookError::Poisoned);
        }
        self.bids.check_integrity()?;
        self.asks.check_integrity()?;
        if self.book_type != BookType::L1_TBBO {
            if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
                if bid >= ask {
                    return Err(BookError::CrossedBook { bid, ask });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn ladder(&self, side: OrderSide) -> &Ladder {
        match side {
            OrderSide::Sell => &self.asks,
            _ => &self.bids,
        }
    }

    fn ladder_mut(&mut self, side: OrderSide) -> &mut Ladder {
        match side {
            OrderSide::Sell => &mut self.asks,
            _ => &mut self.bids,
        }
    }

    /// L1 semantics: one synthetic order per side; a new price replaces
    /// the level. A crossed top is accepted as-is (stale snapshot).
    fn add_top_of_book(&mut self, order: BookOrder) -> BookResult<()> {
        let synthetic = BookOrder::new(
            order.side,
            order.price,
            order.size,
            synthetic_order_id(order.side),
        );
        let ladder = self.ladder_mut(order.side);
        ladder.clear();
        ladder.add(synthetic)
    }

    /// The newer side is authoritative: remove stale-side orders at
    /// crossing prices in priority order until the book is uncrossed,
    /// emitting a synthetic DELETE for each removal.
    fn resolve_crossed(&mut self, newer_side: OrderSide) {
        let stale_side = newer_side.opposite();
        loop {
            let (bid, ask) = match (self.best_bid(), self.best_ask()) {
                (Some(bid), Some(ask)) => (bid, ask),
                _ => return,
            };
            if bid < ask {
                return;
            }
            let stale_order = match self.ladder(stale_side).best_front_order() {
                Some(order) => *order,
                None => return,
            };
            match self.ladder_mut(stale_side).delete(stale_order.order_id) {
                Ok(removed) => {
                    debug!(
                        "uncrossed {}: removed stale {} at {}",
                        self.instrument_id, removed, bid
                    );
                    self.events.push(OrderBookDelta {
                        instrument_id: self.instrument_id.clone(),
                        action: BookAction::Delete,
                        order: Some(removed),
                        sequence: self.last_update_id,
                        ts_event: self.ts_last,
                        ts_init: self.ts_last,
                    });
                }
                Err(err) => {
                    self.poison_if_fatal(&err);
                    return;
                }
            }
        }
    }

    fn poison_if_fatal(&mut self, err: &BookError) {
        if matches!(err, BookError::Overflow | BookError::Integrity(_)) {
            warn!("poisoning book for {}: {err}", self.instrument_id);
            self.poisoned = true;
        }
    }
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderBook({}, {}, bids={}, asks={}, seq={})",
            self.instrument_id,
            self.book_type,
            self.bids.len(),
            self.asks.len(),
            self.last_update_id,
        )
    }
}

/// Fixed per-side order id used by L1 books.
const fn synthetic_order_id(side: OrderSide) -> u64 {
    side as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument() -> InstrumentId {
        "ETHUSDT.BINANCE".parse().unwrap()
    }

    fn order(side: OrderSide, price: &str, size: &str, id: u64) -> BookOrder {
        BookOrder::new(side, price.parse().unwrap(), size.parse().unwrap(), id)
    }

    fn l2_book_with_bids() -> OrderBook {
        let mut book = OrderBook::new(instrument(), BookType::L2_MBP);
        book.add(order(OrderSide::Buy, "100.00", "5", 1)).unwrap();
        book.add(order(OrderSide::Buy, "100.00", "3", 2)).unwrap();
        book.add(order(OrderSide::Buy, "99.99", "10", 3)).unwrap();
        book
    }

    #[test]
    fn test_l2_aggregation() {
        let book = l2_book_with_bids();
        assert_eq!(book.best_bid().unwrap().to_string(), "100.00");
        assert_eq!(book.best_bid_qty().unwrap(), "8".parse().unwrap());
        let depth = book.depth(OrderSide::Buy, 2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0.to_string(), "100.00");
        assert_eq!(depth[0].1, "8".parse().unwrap());
        assert_eq!(depth[1].0.to_string(), "99.99");
        assert_eq!(depth[1].1, "10".parse().unwrap());
    }

    #[test]
    fn test_l3_priority_rules() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        book.add(order(OrderSide::Sell, "101", "5", 1)).unwrap();
        book.add(order(OrderSide::Sell, "101", "5", 2)).unwrap();

        // in-place decrease keeps queue position
        book.update(order(OrderSide::Sell, "101", "4", 1)).unwrap();
        let snapshot = book.snapshot();
        let ids: Vec<u64> = snapshot[0].orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2]);

        // size increase loses it: order 1 moves to the tail
        book.update(order(OrderSide::Sell, "101", "10", 1)).unwrap();
        let snapshot = book.snapshot();
        let ids: Vec<u64> = snapshot[0].orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![2, 1]);

        // price change also re-queues at the new level
        book.update(order(OrderSide::Sell, "102", "10", 1)).unwrap();
        assert_eq!(book.best_ask().unwrap().to_string(), "101");
        book.check_integrity().unwrap();
    }

    #[test]
    fn test_crossed_resolution_removes_stale_side() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        book.add(order(OrderSide::Buy, "100", "10", 1)).unwrap();
        book.add(order(OrderSide::Sell, "99", "4", 2)).unwrap();

        assert_eq!(book.best_ask().unwrap().to_string(), "99");
        assert!(book.best_bid().is_none());

        let events = book.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, BookAction::Delete);
        let removed = events[0].order.unwrap();
        assert_eq!(removed.order_id, 1);
        assert_eq!(removed.side, OrderSide::Buy);
        book.check_integrity().unwrap();
    }

    #[test]
    fn test_midpoint_uses_wider_precision() {
        let mut book = OrderBook::new(instrument(), BookType::L2_MBP);
        book.add(order(OrderSide::Buy, "1.2345", "1", 1)).unwrap();
        book.add(order(OrderSide::Sell, "1.23456", "1", 2)).unwrap();
        let mid = book.midpoint().unwrap();
        assert_eq!(mid.to_string(), "1.23453");
        assert_eq!(mid.precision(), 5);
        assert_eq!(book.spread().unwrap().to_string(), "0.00006");
    }

    #[test]
    fn test_l1_add_replaces_side() {
        let mut book = OrderBook::new(instrument(), BookType::L1_TBBO);
        book.add(order(OrderSide::Buy, "100", "5", 77)).unwrap();
        book.add(order(OrderSide::Buy, "101", "2", 78)).unwrap();
        assert_eq!(book.best_bid().unwrap().to_string(), "101");
        assert_eq!(book.best_bid_qty().unwrap(), "2".parse().unwrap());
        assert_eq!(book.depth(OrderSide::Buy, 10).len(), 1);
    }

    #[test]
    fn test_l1_accepts_crossed_top() {
        let mut book = OrderBook::new(instrument(), BookType::L1_TBBO);
        book.add(order(OrderSide::Buy, "101", "5", 1)).unwrap();
        book.add(order(OrderSide::Sell, "100", "5", 2)).unwrap();
        // stale snapshot tolerated; both sides remain
        assert_eq!(book.best_bid().unwrap().to_string(), "101");
        assert_eq!(book.best_ask().unwrap().to_string(), "100");
        assert!(book.drain_events().is_empty());
    }

    #[test]
    fn test_l1_rejects_foreign_order_ops() {
        let mut book = OrderBook::new(instrument(), BookType::L1_TBBO);
        book.add(order(OrderSide::Buy, "100", "5", 1)).unwrap();
        assert!(matches!(
            book.update(order(OrderSide::Buy, "100", "5", 42)),
            Err(BookError::BookTypeMismatch { .. })
        ));
        assert!(matches!(
            book.delete(OrderSide::Buy, 42),
            Err(BookError::BookTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_sequence_gating() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        let delta = OrderBookDelta::add(
            instrument(),
            order(OrderSide::Buy, "100", "5", 1),
            10,
            1_000,
            1_001,
        )
        .unwrap();
        book.apply(&delta).unwrap();
        assert_eq!(book.last_update_id(), 10);
        assert_eq!(book.ts_last(), 1_000);

        let stale = OrderBookDelta::add(
            instrument(),
            order(OrderSide::Buy, "99", "5", 2),
            10,
            1_002,
            1_003,
        )
        .unwrap();
        assert!(matches!(
            book.apply(&stale),
            Err(BookError::StaleDelta { sequence: 10, last: 10 })
        ));
        // book unchanged by the rejected delta
        assert_eq!(book.depth(OrderSide::Buy, 10).len(), 1);
    }

    #[test]
    fn test_apply_rejects_wrong_instrument() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        let delta = OrderBookDelta::add(
            "BTCUSDT.BINANCE".parse().unwrap(),
            order(OrderSide::Buy, "100", "5", 1),
            1,
            0,
            0,
        )
        .unwrap();
        assert!(matches!(
            book.apply(&delta),
            Err(BookError::InstrumentMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_empties_book() {
        let mut book = l2_book_with_bids();
        book.add(order(OrderSide::Sell, "101.00", "5", 9)).unwrap();
        book.clear(None);
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(book.snapshot().is_empty());
    }

    #[test]
    fn test_clear_single_side() {
        let mut book = l2_book_with_bids();
        book.add(order(OrderSide::Sell, "101.00", "5", 9)).unwrap();
        book.clear(Some(OrderSide::Buy));
        assert!(book.best_bid().is_none());
        assert_eq!(book.best_ask().unwrap().to_string(), "101.00");
    }

    #[test]
    fn test_duplicate_and_unknown_ids() {
        let mut book = l2_book_with_bids();
        assert!(matches!(
            book.add(order(OrderSide::Buy, "98.00", "1", 1)),
            Err(BookError::DuplicateOrderId(1))
        ));
        assert!(matches!(
            book.update(order(OrderSide::Buy, "98.00", "1", 42)),
            Err(BookError::UnknownOrderId(42))
        ));
        assert!(matches!(
            book.delete(OrderSide::Buy, 42),
            Err(BookError::UnknownOrderId(42))
        ));
        // all rejected without changing state
        assert_eq!(book.depth(OrderSide::Buy, 10).len(), 2);
        book.check_integrity().unwrap();
    }

    #[test]
    fn test_simulate_fills_walks_levels() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        book.add(order(OrderSide::Sell, "101", "5", 1)).unwrap();
        book.add(order(OrderSide::Sell, "101", "3", 2)).unwrap();
        book.add(order(OrderSide::Sell, "102", "10", 3)).unwrap();

        let taker = order(OrderSide::Buy, "102", "12", 99);
        let fills = book.simulate_fills(&taker);
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0], ("101".parse().unwrap(), "5".parse().unwrap()));
        assert_eq!(fills[1], ("101".parse().unwrap(), "3".parse().unwrap()));
        assert_eq!(fills[2], ("102".parse().unwrap(), "4".parse().unwrap()));
        // simulation does not mutate
        assert_eq!(book.best_ask_qty().unwrap(), "8".parse().unwrap());
    }

    #[test]
    fn test_simulate_fills_respects_limit() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        book.add(order(OrderSide::Sell, "101", "5", 1)).unwrap();
        book.add(order(OrderSide::Sell, "102", "5", 2)).unwrap();

        let taker = order(OrderSide::Buy, "101", "8", 99);
        let fills = book.simulate_fills(&taker);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0], ("101".parse().unwrap(), "5".parse().unwrap()));
    }

    #[test]
    fn test_snapshot_serializes() {
        let book = l2_book_with_bids();
        let json = serde_json::to_string(&book.snapshot()).unwrap();
        let back: Vec<LevelSnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book.snapshot());
    }

    #[test]
    fn test_overflow_poisons_book() {
        let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
        let huge = BookOrder::new(
            OrderSide::Buy,
            "100".parse().unwrap(),
            Quantity::from_raw(u64::MAX, 0).unwrap(),
            1,
        );
        book.add(huge).unwrap();
        let more = order(OrderSide::Buy, "100", "1", 2);
        assert!(matches!(book.add(more), Err(BookError::Overflow)));
        assert!(book.is_poisoned());
        assert!(matches!(
            book.add(order(OrderSide::Buy, "99", "1", 3)),
            Err(BookError::Poisoned)
        ));
    }
}
