//! One side of the book.

use std::collections::{BTreeMap, HashMap};

use hermes_core::{OrderSide, Price, Quantity};
use market_data::BookOrder;

use crate::error::{BookError, BookResult};
use crate::level::Level;
use crate::price::BookPrice;

/// A price-ordered ladder of levels with an order-id index.
///
/// The map is keyed by [`BookPrice`] so iteration always starts at the best
/// price for the side. The index from order id to price key makes updates
/// and removals O(log n) in the level count; it is in bijection with the
/// level contents after every successful operation.
#[derive(Debug, Clone)]
pub struct Ladder {
    side: OrderSide,
    levels: BTreeMap<BookPrice, Level>,
    cache: HashMap<u64, BookPrice>,
}

impl Ladder {
    pub fn new(side: OrderSide) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// Number of price levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of resting orders across all levels.
    pub fn order_count(&self) -> usize {
        self.cache.len()
    }

    pub fn contains(&self, order_id: u64) -> bool {
        self.cache.contains_key(&order_id)
    }

    /// Levels from best to worst.
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    /// The best level, if any.
    pub fn best(&self) -> Option<&Level> {
        self.levels.values().next()
    }

    pub fn best_price(&self) -> Option<Price> {
        self.best().map(|level| level.price.value)
    }

    pub fn best_volume(&self) -> Option<Quantity> {
        self.best().map(Level::volume)
    }

    /// The order with the highest priority on the ladder: front of the
    /// best level.
    pub fn best_front_order(&self) -> Option<&BookOrder> {
        self.best().and_then(Level::front)
    }

    /// Insert a new order at the tail of its price level.
    pub fn add(&mut self, order: BookOrder) -> BookResult<()> {
        if self.cache.contains_key(&order.order_id) {
            return Err(BookError::DuplicateOrderId(order.order_id));
        }
        let key = BookPrice::new(order.price, self.side);
        let result = self
            .levels
            .entry(key)
            .or_insert_with(|| Level::new(key))
            .add(order);
        if result.is_err() {
            // drop a level the failed insert may have created
            if self.levels.get(&key).is_some_and(Level::is_empty) {
                self.levels.remove(&key);
            }
            return result;
        }
        self.cache.insert(order.order_id, key);
        Ok(())
    }

    /// Update a known order under price-time priority: the queue position
    /// is preserved only when the price is unchanged and the size did not
    /// increase; otherwise the order moves to the tail of the (new) level.
    /// A zero size removes the order.
    pub fn update(&mut self, order: BookOrder) -> BookResult<()> {
        let key = *self
            .cache
            .get(&order.order_id)
            .ok_or(BookError::UnknownOrderId(order.order_id))?;

        if order.size.is_zero() {
            self.delete(order.order_id)?;
            return Ok(());
        }

        let new_key = BookPrice::new(order.price, self.side);
        if key == new_key {
            let level = self.levels.get_mut(&key).ok_or_else(|| {
                BookError::Integrity(format!(
                    "index points at missing level {}",
                    key.value
                ))
            })?;
            let existing_size = level
                .get(order.order_id)
                .map(|existing| existing.size)
                .ok_or_else(|| {
                    BookError::Integrity(format!(
                        "index points at level {} without order {}",
                        key.value, order.order_id
                    ))
                })?;
            if order.size > existing_size {
                // size increase loses time priority
                level.delete(order.order_id)?;
                level.add(order)?;
            } else {
                level.update(order)?;
            }
            Ok(())
        } else {
            self.delete(order.order_id)?;
            self.add(order)
        }
    }

    /// Remove a known order; an emptied level is dropped.
    pub fn delete(&mut self, order_id: u64) -> BookResult<BookOrder> {
        let key = self
            .cache
            .remove(&order_id)
            .ok_or(BookError::UnknownOrderId(order_id))?;
        let level = self.levels.get_mut(&key).ok_or_else(|| {
            BookError::Integrity(format!("index points at missing level {}", key.value))
        })?;
        let removed = level.delete(order_id).map_err(|err| match err {
            BookError::UnknownOrderId(id) => BookError::Integrity(format!(
                "index points at level {} without order {id}",
                key.value
            )),
            other => other,
        })?;
        if level.is_empty() {
            self.levels.remove(&key);
        }
        Ok(removed)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.cache.clear();
    }

    /// Verify that the order-id index and the level contents are in
    /// bijection and that no level is empty.
    pub fn check_integrity(&self) -> BookResult<()> {
        let mut indexed = 0usize;
        for (order_id, key) in &self.cache {
            let level = self.levels.get(key).ok_or_else(|| {
                BookError::Integrity(format!("index points at missing level {}", key.value))
            })?;
            if level.get(*order_id).is_none() {
                return Err(BookError::Integrity(format!(
                    "index points at level {} without order {order_id}",
                    key.value
                )));
            }
            indexed += 1;
        }
        let resting: usize = self.levels.values().map(Level::len).sum();
        if indexed != resting {
            return Err(BookError::Integrity(format!(
                "index holds {indexed} orders, ladders hold {resting}"
            )));
        }
        for level in self.levels.values() {
            if level.is_empty() {
                return Err(BookError::Integrity(format!(
                    "empty level at {}",
                    level.price.value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, price: &str, size: &str) -> BookOrder {
        BookOrder::new(OrderSide::Buy, price.parse().unwrap(), size.parse().unwrap(), id)
    }

    fn ladder_with_orders() -> Ladder {
        let mut ladder = Ladder::new(OrderSide::Buy);
        ladder.add(order(1, "100.00", "5")).unwrap();
        ladder.add(order(2, "100.00", "3")).unwrap();
        ladder.add(order(3, "99.99", "10")).unwrap();
        ladder
    }

    #[test]
    fn test_best_is_highest_bid() {
        let ladder = ladder_with_orders();
        assert_eq!(ladder.best_price().unwrap().to_string(), "100.00");
        assert_eq!(ladder.best_volume().unwrap(), "8".parse().unwrap());
        assert_eq!(ladder.len(), 2);
        assert_eq!(ladder.order_count(), 3);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut ladder = ladder_with_orders();
        assert!(matches!(
            ladder.add(order(1, "98.00", "1")),
            Err(BookError::DuplicateOrderId(1))
        ));
        // state unchanged
        assert_eq!(ladder.order_count(), 3);
        ladder.check_integrity().unwrap();
    }

    #[test]
    fn test_update_same_price_no_increase_keeps_position() {
        let mut ladder = ladder_with_orders();
        ladder.update(order(1, "100.00", "4")).unwrap();
        let best = ladder.best().unwrap();
        let ids: Vec<u64> = best.orders().iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(best.front().unwrap().size, "4".parse().unwrap());
    }

    #[test]
    fn test_update_size_increase_moves_to_tail() {
        let mut ladder = ladder_with_orders();
        ladder.update(order(1, "100.00", "9")).unwrap();
        let best = ladder.best().unwrap();
        let ids: Vec<u64> = best.orders().iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_update_price_change_moves_level() {
        let mut ladder = ladder_with_orders();
        ladder.update(order(3, "100.00", "10")).unwrap();
        assert_eq!(ladder.len(), 1);
        let ids: Vec<u64> = ladder.best().unwrap().orders().iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        ladder.check_integrity().unwrap();
    }

    #[test]
    fn test_update_zero_size_removes() {
        let mut ladder = ladder_with_orders();
        ladder.update(order(3, "99.99", "0")).unwrap();
        assert!(!ladder.contains(3));
        assert_eq!(ladder.len(), 1);
    }

    #[test]
    fn test_delete_drops_empty_level() {
        let mut ladder = ladder_with_orders();
        ladder.delete(3).unwrap();
        assert_eq!(ladder.len(), 1);
        assert!(matches!(
            ladder.delete(3),
            Err(BookError::UnknownOrderId(3))
        ));
        ladder.check_integrity().unwrap();
    }

    #[test]
    fn test_clear() {
        let mut ladder = ladder_with_orders();
        ladder.clear();
        assert!(ladder.is_empty());
        assert_eq!(ladder.order_count(), 0);
        assert!(ladder.best_price().is_none());
    }
}
