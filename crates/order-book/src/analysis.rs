//! Depth-weighted book queries.
//!
//! Analytics over the resting liquidity: cumulative size to a price,
//! volume-weighted average fill prices, and per-side exposure. Results
//! that involve division are `f64` projections; the book itself stays in
//! fixed point.

use hermes_core::{OrderSide, Price, Quantity, FIXED_SCALAR};

use crate::book::OrderBook;

impl OrderBook {
    /// Total size resting on `side` at prices as good as `price` or
    /// better: at or above on the bid ladder, at or below on the ask
    /// ladder.
    pub fn quantity_for_price(&self, price: Price, side: OrderSide) -> Quantity {
        let mut total = Quantity::ZERO;
        for level in self.ladder(side).levels() {
            let within = match side {
                OrderSide::Buy => level.price.value >= price,
                _ => level.price.value <= price,
            };
            if !within {
                break;
            }
            // cumulative depth saturates at the type ceiling rather than fail
            total = total.checked_add(level.volume()).unwrap_or(total);
        }
        total
    }

    /// Volume-weighted average price to trade `qty` against `side`'s
    /// resting liquidity, walking levels best to worst. `None` when the
    /// side cannot fill the quantity.
    pub fn avg_px_for_quantity(&self, qty: Quantity, side: OrderSide) -> Option<f64> {
        if qty.is_zero() {
            return None;
        }
        let mut remaining = qty;
        let mut notional: i128 = 0;
        for level in self.ladder(side).levels() {
            let available = level.volume();
            let take = remaining.min(available);
            notional += level.price.value.mul_qty(take);
            remaining = remaining.saturating_sub(take);
            if remaining.is_zero() {
                let filled = qty.as_f64();
                return Some(notional as f64 / FIXED_SCALAR as f64 / filled);
            }
        }
        None
    }

    /// Total notional resting on one side, as an analytics float.
    pub fn exposure(&self, side: OrderSide) -> f64 {
        let total: i128 = self.ladder(side).levels().map(|level| level.exposure()).sum();
        total as f64 / FIXED_SCALAR as f64
    }
}
