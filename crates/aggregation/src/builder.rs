//! OHLCV accumulation.

use hermes_core::{Price, Quantity};
use market_data::{Bar, BarType};

use crate::error::{AggregationError, AggregationResult};

/// Accumulates open/high/low/close/volume for one bar in progress.
///
/// The first update of a window sets the open; extrema and close track
/// every subsequent update; volume adds up with checked arithmetic.
/// Building resets the builder for the next window.
#[derive(Debug, Clone)]
pub struct BarBuilder {
    bar_type: BarType,
    open: Option<Price>,
    high: Option<Price>,
    low: Option<Price>,
    close: Option<Price>,
    volume: Quantity,
    count: usize,
    ts_last: u64,
}

impl BarBuilder {
    pub fn new(bar_type: BarType) -> Self {
        Self {
            bar_type,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: Quantity::ZERO,
            count: 0,
            ts_last: 0,
        }
    }

    pub fn bar_type(&self) -> &BarType {
        &self.bar_type
    }

    /// Number of updates folded into the bar in progress.
    pub fn count(&self) -> usize {
        self.count
    }

    /// True once the window has seen at least one update.
    pub fn is_initialized(&self) -> bool {
        self.open.is_some()
    }

    /// Event time of the last folded update.
    pub fn ts_last(&self) -> u64 {
        self.ts_last
    }

    /// Accumulated volume of the bar in progress.
    pub fn volume(&self) -> Quantity {
        self.volume
    }

    /// Fold one price/size observation into the bar in progress.
    pub fn update(&mut self, price: Price, size: Quantity, ts_event: u64) -> AggregationResult<()> {
        match self.open {
            None => {
                self.open = Some(price);
                self.high = Some(price);
                self.low = Some(price);
            }
            Some(_) => {
                if self.high.map_or(true, |high| price > high) {
                    self.high = Some(price);
                }
                if self.low.map_or(true, |low| price < low) {
                    self.low = Some(price);
                }
            }
        }
        self.close = Some(price);
        self.volume = self.volume.checked_add(size)?;
        self.count += 1;
        self.ts_last = ts_event;
        Ok(())
    }

    /// Emit the bar and reset for the next window.
    pub fn build(&mut self, ts_event: u64, ts_init: u64) -> AggregationResult<Bar> {
        let (open, high, low, close) = match (self.open, self.high, self.low, self.close) {
            (Some(open), Some(high), Some(low), Some(close)) => (open, high, low, close),
            _ => return Err(AggregationError::EmptyBuilder),
        };
        let bar = Bar::new(
            self.bar_type.clone(),
            open,
            high,
            low,
            close,
            self.volume,
            ts_event,
            ts_init,
        )?;
        self.open = None;
        self.high = None;
        self.low = None;
        self.close = None;
        self.volume = Quantity::ZERO;
        self.count = 0;
        Ok(bar)
    }
}
