//! Book order.

use std::fmt;

use serde::{Deserialize, Serialize};

use hermes_core::{OrderSide, Price, Quantity};

/// One resting order (or synthetic level) in an order book.
///
/// For L3 books `order_id` is the venue's order number; for L2 it names the
/// price level; for L1 the engine assigns a fixed synthetic id per side.
/// A zero size is legal in deltas, where it means "remove".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookOrder {
    pub side: OrderSide,
    pub price: Price,
    pub size: Quantity,
    pub order_id: u64,
}

impl BookOrder {
    pub fn new(side: OrderSide, price: Price, size: Quantity, order_id: u64) -> Self {
        Self {
            side,
            price,
            size,
            order_id,
        }
    }

    /// Notional value at the shared 10^9 scale.
    #[inline]
    pub fn exposure(&self) -> i128 {
        self.price.mul_qty(self.size)
    }

    /// Size signed by side: positive for buys, negative for sells.
    #[inline]
    pub fn signed_size(&self) -> f64 {
        match self.side {
            OrderSide::Sell => -self.size.as_f64(),
            _ => self.size.as_f64(),
        }
    }
}

impl fmt::Display for BookOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} @ {}",
            self.order_id, self.side, self.size, self.price
        )
    }
}
