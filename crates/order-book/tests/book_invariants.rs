//! Invariant sweeps over the book engine.
//!
//! Drives an L3 book with long randomized operation sequences and checks
//! the structural invariants after every step, plus the delta/inverse
//! restore property.

use rand::prelude::*;

use hermes_core::{BookType, InstrumentId, OrderSide, Price, Quantity};
use market_data::{BookOrder, OrderBookDelta};
use order_book::{BookError, OrderBook};

fn instrument() -> InstrumentId {
    "EURUSD.SIM".parse().unwrap()
}

fn price_from_cents(cents: i64) -> Price {
    Price::from_raw(cents * 10_000_000, 2).unwrap()
}

fn qty(units: u64) -> Quantity {
    Quantity::from_raw(units * 1_000_000_000, 0).unwrap()
}

/// Random ADD/UPDATE/DELETE storm: the order-id index stays in bijection
/// with the level contents and the book stays uncrossed after every step.
#[test]
fn random_l3_operations_preserve_integrity() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(20240614);
    let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
    let mut live_ids: Vec<u64> = Vec::new();
    let mut next_id: u64 = 1;

    for step in 0..5_000 {
        let roll: f64 = rng.gen();
        if roll < 0.5 || live_ids.is_empty() {
            let side = if rng.gen_bool(0.5) {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            };
            // bids low, asks high, with a thin overlap band to exercise
            // crossed-book resolution
            let cents = match side {
                OrderSide::Buy => rng.gen_range(9_900..=10_005),
                _ => rng.gen_range(9_995..=10_100),
            };
            let order = BookOrder::new(
                side,
                price_from_cents(cents),
                qty(rng.gen_range(1..=50)),
                next_id,
            );
            book.add(order).unwrap_or_else(|err| {
                panic!("step {step}: add {order} failed: {err}");
            });
            live_ids.push(next_id);
            next_id += 1;
        } else if roll < 0.75 {
            let index = rng.gen_range(0..live_ids.len());
            let order_id = live_ids[index];
            let current = find_order(&book, order_id);
            match current {
                Some(existing) => {
                    let updated = BookOrder::new(
                        existing.side,
                        existing.price,
                        qty(rng.gen_range(1..=50)),
                        order_id,
                    );
                    book.update(updated).unwrap_or_else(|err| {
                        panic!("step {step}: update #{order_id} failed: {err}");
                    });
                }
                // removed earlier by crossed-book resolution
                None => {
                    live_ids.swap_remove(index);
                }
            }
        } else {
            let index = rng.gen_range(0..live_ids.len());
            let order_id = live_ids.swap_remove(index);
            match find_order(&book, order_id) {
                Some(existing) => {
                    book.delete(existing.side, order_id).unwrap_or_else(|err| {
                        panic!("step {step}: delete #{order_id} failed: {err}");
                    });
                }
                None => {
                    let side = if rng.gen_bool(0.5) {
                        OrderSide::Buy
                    } else {
                        OrderSide::Sell
                    };
                    assert!(matches!(
                        book.delete(side, order_id),
                        Err(BookError::UnknownOrderId(_))
                    ));
                }
            }
        }

        // uncrossing may have consumed ids the local list still tracks;
        // that is resolved lazily above. The structural invariants must
        // hold unconditionally.
        book.check_integrity()
            .unwrap_or_else(|err| panic!("step {step}: integrity: {err}"));

        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "step {step}: crossed {bid} >= {ask}");
        }
    }

    // depth comes out best to worst on both sides
    let bids = book.depth(OrderSide::Buy, usize::MAX);
    assert!(bids.windows(2).all(|pair| pair[0].0 > pair[1].0));
    let asks = book.depth(OrderSide::Sell, usize::MAX);
    assert!(asks.windows(2).all(|pair| pair[0].0 < pair[1].0));
}

fn find_order(book: &OrderBook, order_id: u64) -> Option<BookOrder> {
    book.snapshot()
        .into_iter()
        .flat_map(|level| level.orders)
        .find(|order| order.order_id == order_id)
}

/// ADD followed by its inverse DELETE restores the snapshot exactly; an
/// in-place UPDATE followed by its inverse UPDATE does too.
#[test]
fn delta_and_inverse_restore_snapshot() {
    let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
    let mut sequence = 0u64;
    let apply = |book: &mut OrderBook, delta: OrderBookDelta| {
        book.apply(&delta).unwrap();
    };

    for (id, cents, units) in [(1, 9_990, 10), (2, 9_990, 5), (3, 9_980, 7)] {
        sequence += 1;
        let order = BookOrder::new(OrderSide::Buy, price_from_cents(cents), qty(units), id);
        apply(
            &mut book,
            OrderBookDelta::add(instrument(), order, sequence, sequence, sequence).unwrap(),
        );
    }

    let baseline = book.snapshot();

    // add then delete
    let order = BookOrder::new(OrderSide::Buy, price_from_cents(9_970), qty(3), 4);
    sequence += 1;
    apply(
        &mut book,
        OrderBookDelta::add(instrument(), order, sequence, sequence, sequence).unwrap(),
    );
    assert_ne!(book.snapshot(), baseline);
    sequence += 1;
    apply(
        &mut book,
        OrderBookDelta::delete(instrument(), order, sequence, sequence, sequence).unwrap(),
    );
    assert_eq!(book.snapshot(), baseline);

    // update then inverse update, on an order alone at its level so the
    // size-increase requeue cannot reorder anything
    let shrunk = BookOrder::new(OrderSide::Buy, price_from_cents(9_980), qty(4), 3);
    sequence += 1;
    apply(
        &mut book,
        OrderBookDelta::update(instrument(), shrunk, sequence, sequence, sequence).unwrap(),
    );
    assert_ne!(book.snapshot(), baseline);
    let restored = BookOrder::new(OrderSide::Buy, price_from_cents(9_980), qty(7), 3);
    sequence += 1;
    apply(
        &mut book,
        OrderBookDelta::update(instrument(), restored, sequence, sequence, sequence).unwrap(),
    );
    assert_eq!(book.snapshot(), baseline);
}

/// A cleared book reports nothing on either side.
#[test]
fn clear_resets_to_empty() {
    let mut book = OrderBook::new(instrument(), BookType::L3_MBO);
    for id in 1..=20u64 {
        let side = if id % 2 == 0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let cents = if side == OrderSide::Buy {
            9_900 + id as i64
        } else {
            10_050 + id as i64
        };
        book.add(BookOrder::new(side, price_from_cents(cents), qty(1), id))
            .unwrap();
    }
    let sequence = book.last_update_id() + 1;
    book.apply(&OrderBookDelta::clear(instrument(), sequence, 1, 1).unwrap())
        .unwrap();
    assert!(book.best_bid().is_none());
    assert!(book.best_ask().is_none());
    assert!(book.snapshot().is_empty());
    book.check_integrity().unwrap();
}
