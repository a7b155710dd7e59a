//! One price level.

use hermes_core::Quantity;
use market_data::BookOrder;

use crate::error::{BookError, BookResult};
use crate::price::BookPrice;

/// All orders resting at one price on one side, in arrival order.
///
/// The aggregate volume is maintained incrementally with checked
/// arithmetic; an overflow fails the mutating operation and the level is
/// left unusable for further aggregation, which the book treats as fatal.
#[derive(Debug, Clone)]
pub struct Level {
    pub price: BookPrice,
    orders: Vec<BookOrder>,
    volume_raw: u64,
}

impl Level {
    pub fn new(price: BookPrice) -> Self {
        Self {
            price,
            orders: Vec::new(),
            volume_raw: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in FIFO arrival order.
    pub fn orders(&self) -> &[BookOrder] {
        &self.orders
    }

    /// The order with time priority at this price.
    pub fn front(&self) -> Option<&BookOrder> {
        self.orders.first()
    }

    pub fn get(&self, order_id: u64) -> Option<&BookOrder> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Append an order at the tail of the queue.
    pub fn add(&mut self, order: BookOrder) -> BookResult<()> {
        self.volume_raw = self
            .volume_raw
            .checked_add(order.size.raw())
            .ok_or(BookError::Overflow)?;
        self.orders.push(order);
        Ok(())
    }

    /// Replace an order in place, preserving its queue position.
    pub fn update(&mut self, order: BookOrder) -> BookResult<()> {
        let slot = self
            .orders
            .iter_mut()
            .find(|existing| existing.order_id == order.order_id)
            .ok_or(BookError::UnknownOrderId(order.order_id))?;
        let old_size = slot.size.raw();
        *slot = order;
        self.volume_raw = self
            .volume_raw
            .checked_sub(old_size)
            .and_then(|v| v.checked_add(order.size.raw()))
            .ok_or(BookError::Overflow)?;
        Ok(())
    }

    /// Remove an order, preserving the relative order of the rest.
    pub fn delete(&mut self, order_id: u64) -> BookResult<BookOrder> {
        let index = self
            .orders
            .iter()
            .position(|order| order.order_id == order_id)
            .ok_or(BookError::UnknownOrderId(order_id))?;
        let removed = self.orders.remove(index);
        self.volume_raw = self
            .volume_raw
            .checked_sub(removed.size.raw())
            .ok_or(BookError::Overflow)?;
        Ok(removed)
    }

    /// Aggregate size across the level.
    pub fn volume(&self) -> Quantity {
        let precision = self
            .orders
            .iter()
            .map(|order| order.size.precision())
            .max()
            .unwrap_or(0);
        // raw is maintained checked, so this cannot fail validation
        Quantity::from_raw(self.volume_raw, precision).unwrap_or(Quantity::ZERO)
    }

    /// Aggregate notional at the shared 10^9 scale.
    pub fn exposure(&self) -> i128 {
        self.orders.iter().map(BookOrder::exposure).sum()
    }
}
