//! Bar aggregators.
//!
//! One aggregator instance serves one bar type. Quote-priced series (BID,
//! ASK, MID) fold quotes and ignore trades; LAST series fold trades and
//! ignore quotes, so one data stream can feed every aggregator without
//! double counting.

use std::sync::Arc;

use log::debug;

use hermes_clock::Clock;
use hermes_core::{
    AggregationSource, BarAggregation, Price, PriceType, Quantity, FIXED_SCALAR,
};
use market_data::{Bar, BarType, QuoteTick, TradeTick};

use crate::builder::BarBuilder;
use crate::error::{AggregationError, AggregationResult};

/// A stateful consumer of ticks that emits bars of one [`BarType`].
pub trait BarAggregator {
    fn bar_type(&self) -> &BarType;

    /// Fold a quote; returns the bars this update closed.
    fn handle_quote(&mut self, quote: &QuoteTick) -> AggregationResult<Vec<Bar>>;

    /// Fold a trade; returns the bars this update closed.
    fn handle_trade(&mut self, trade: &TradeTick) -> AggregationResult<Vec<Bar>>;
}

/// Construct the aggregator matching the bar type's aggregation.
pub fn aggregator_for(
    bar_type: BarType,
    clock: Arc<dyn Clock>,
) -> AggregationResult<Box<dyn BarAggregator>> {
    match bar_type.spec.aggregation {
        BarAggregation::Tick => Ok(Box::new(TickBarAggregator::new(bar_type, clock)?)),
        BarAggregation::Volume => Ok(Box::new(VolumeBarAggregator::new(bar_type, clock)?)),
        BarAggregation::Value => Ok(Box::new(ValueBarAggregator::new(bar_type, clock)?)),
        BarAggregation::Second
        | BarAggregation::Minute
        | BarAggregation::Hour
        | BarAggregation::Day => Ok(Box::new(TimeBarAggregator::new(bar_type, clock)?)),
    }
}

/// State shared by every aggregator: the builder, the clock stamping
/// `ts_init`, and the quote/trade routing rules.
struct AggregatorCore {
    builder: BarBuilder,
    clock: Arc<dyn Clock>,
}

impl AggregatorCore {
    fn new(
        bar_type: BarType,
        clock: Arc<dyn Clock>,
        expected: BarAggregation,
    ) -> AggregationResult<Self> {
        if bar_type.aggregation_source != AggregationSource::Internal {
            return Err(AggregationError::ExternalBarType(bar_type.to_string()));
        }
        if bar_type.spec.aggregation != expected {
            return Err(AggregationError::AggregationMismatch {
                bar_type: bar_type.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(Self {
            builder: BarBuilder::new(bar_type),
            clock,
        })
    }

    /// As [`Self::new`] but accepting any time-driven aggregation.
    fn new_time_driven(bar_type: BarType, clock: Arc<dyn Clock>) -> AggregationResult<Self> {
        if bar_type.aggregation_source != AggregationSource::Internal {
            return Err(AggregationError::ExternalBarType(bar_type.to_string()));
        }
        if !bar_type.spec.aggregation.is_time_driven() {
            return Err(AggregationError::AggregationMismatch {
                bar_type: bar_type.to_string(),
                expected: "time".to_string(),
            });
        }
        Ok(Self {
            builder: BarBuilder::new(bar_type),
            clock,
        })
    }

    fn bar_type(&self) -> &BarType {
        self.builder.bar_type()
    }

    fn step(&self) -> usize {
        self.bar_type().spec.step
    }

    fn price_type(&self) -> PriceType {
        self.bar_type().spec.price_type
    }

    /// Price/size a quote contributes to this series, if any.
    fn quote_inputs(&self, quote: &QuoteTick) -> AggregationResult<Option<(Price, Quantity)>> {
        if self.price_type() == PriceType::Last {
            return Ok(None);
        }
        let price = quote.extract_price(self.price_type())?;
        let size = quote.extract_size(self.price_type())?;
        Ok(Some((price, size)))
    }

    fn takes_trades(&self) -> bool {
        self.price_type() == PriceType::Last
    }

    /// Close the bar in progress; `ts_init` is the emit wall-clock time.
    fn build(&mut self, ts_event: u64) -> AggregationResult<Bar> {
        let ts_init = self.clock.timestamp_ns().max(ts_event);
        self.builder.build(ts_event, ts_init)
    }
}

/// Closes a bar every `step` ticks.
pub struct TickBarAggregator {
    core: AggregatorCore,
}

impl TickBarAggregator {
    pub fn new(bar_type: BarType, clock: Arc<dyn Clock>) -> AggregationResult<Self> {
        Ok(Self {
            core: AggregatorCore::new(bar_type, clock, BarAggregation::Tick)?,
        })
    }

    fn apply(&mut self, price: Price, size: Quantity, ts_event: u64) -> AggregationResult<Vec<Bar>> {
        self.core.builder.update(price, size, ts_event)?;
        if self.core.builder.count() >= self.core.step() {
            return Ok(vec![self.core.build(ts_event)?]);
        }
        Ok(Vec::new())
    }
}

impl BarAggregator for TickBarAggregator {
    fn bar_type(&self) -> &BarType {
        self.core.bar_type()
    }

    fn handle_quote(&mut self, quote: &QuoteTick) -> AggregationResult<Vec<Bar>> {
        match self.core.quote_inputs(quote)? {
            Some((price, size)) => self.apply(price, size, quote.ts_event),
            None => Ok(Vec::new()),
        }
    }

    fn handle_trade(&mut self, trade: &TradeTick) -> AggregationResult<Vec<Bar>> {
        if self.core.takes_trades() {
            return self.apply(trade.price, trade.size, trade.ts_event);
        }
        Ok(Vec::new())
    }
}

/// Closes a bar each time `step` whole units of size accumulate.
///
/// A tick larger than what the current bar can absorb is split: the bar
/// closes at exactly the step and the remainder rolls into the next bar,
/// possibly closing several bars from one tick.
pub struct VolumeBarAggregator {
    core: AggregatorCore,
    cum_raw: u64,
}

impl VolumeBarAggregator {
    pub fn new(bar_type: BarType, clock: Arc<dyn Clock>) -> AggregationResult<Self> {
        Ok(Self {
            core: AggregatorCore::new(bar_type, clock, BarAggregation::Volume)?,
            cum_raw: 0,
        })
    }

    fn apply(&mut self, price: Price, size: Quantity, ts_event: u64) -> AggregationResult<Vec<Bar>> {
        let threshold = self.core.step() as u128 * FIXED_SCALAR as u128;
        let mut bars = Vec::new();
        let mut remaining = size;
        while !remaining.is_zero() {
            if u128::from(self.cum_raw) + u128::from(remaining.raw()) < threshold {
                self.cum_raw += remaining.raw();
                self.core.builder.update(price, remaining, ts_event)?;
                break;
            }
            // cum + remaining >= threshold, so the difference fits the tick
            let diff_raw = (threshold - u128::from(self.cum_raw)) as u64;
            let portion = Quantity::from_raw(diff_raw, remaining.precision())?;
            self.core.builder.update(price, portion, ts_event)?;
            bars.push(self.core.build(ts_event)?);
            self.cum_raw = 0;
            remaining = remaining.saturating_sub(portion);
        }
        Ok(bars)
    }
}

impl BarAggregator for VolumeBarAggregator {
    fn bar_type(&self) -> &BarType {
        self.core.bar_type()
    }

    fn handle_quote(&mut self, quote: &QuoteTick) -> AggregationResult<Vec<Bar>> {
        match self.core.quote_inputs(quote)? {
            Some((price, size)) => self.apply(price, size, quote.ts_event),
            None => Ok(Vec::new()),
        }
    }

    fn handle_trade(&mut self, trade: &TradeTick) -> AggregationResult<Vec<Bar>> {
        if self.core.takes_trades() {
            return self.apply(trade.price, trade.size, trade.ts_event);
        }
        Ok(Vec::new())
    }
}

/// Closes a bar each time `step` whole units of notional accumulate.
pub struct ValueBarAggregator {
    core: AggregatorCore,
    cum_value: i128,
}

impl ValueBarAggregator {
    pub fn new(bar_type: BarType, clock: Arc<dyn Clock>) -> AggregationResult<Self> {
        Ok(Self {
            core: AggregatorCore::new(bar_type, clock, BarAggregation::Value)?,
            cum_value: 0,
        })
    }

    fn apply(&mut self, price: Price, size: Quantity, ts_event: u64) -> AggregationResult<Vec<Bar>> {
        let threshold = self.core.step() as i128 * i128::from(FIXED_SCALAR);
        let mut bars = Vec::new();
        let mut remaining = size;
        while !remaining.is_zero() {
            let notional = price.mul_qty(remaining);
            if notional <= 0 {
                // zero-priced ticks add size but no value progress
                self.core.builder.update(price, remaining, ts_event)?;
                break;
            }
            if self.cum_value + notional < threshold {
                self.cum_value += notional;
                self.core.builder.update(price, remaining, ts_event)?;
                break;
            }
            let value_diff = threshold - self.cum_value;
            let portion_raw = value_diff
                .saturating_mul(i128::from(FIXED_SCALAR))
                .checked_div(i128::from(price.raw()))
                .unwrap_or(0);
            let portion_raw = if portion_raw >= i128::from(remaining.raw()) {
                remaining.raw()
            } else {
                portion_raw as u64
            };
            if portion_raw == 0 {
                // threshold inside one raw unit of size; absorb the rest
                self.cum_value += notional;
                self.core.builder.update(price, remaining, ts_event)?;
                break;
            }
            let portion = Quantity::from_raw(portion_raw, remaining.precision())?;
            self.core.builder.update(price, portion, ts_event)?;
            bars.push(self.core.build(ts_event)?);
            self.cum_value = 0;
            remaining = remaining.saturating_sub(portion);
        }
        Ok(bars)
    }
}

impl BarAggregator for ValueBarAggregator {
    fn bar_type(&self) -> &BarType {
        self.core.bar_type()
    }

    fn handle_quote(&mut self, quote: &QuoteTick) -> AggregationResult<Vec<Bar>> {
        match self.core.quote_inputs(quote)? {
            Some((price, size)) => self.apply(price, size, quote.ts_event),
            None => Ok(Vec::new()),
        }
    }

    fn handle_trade(&mut self, trade: &TradeTick) -> AggregationResult<Vec<Bar>> {
        if self.core.takes_trades() {
            return self.apply(trade.price, trade.size, trade.ts_event);
        }
        Ok(Vec::new())
    }
}

/// Closes a bar at the first tick at or past the window boundary.
///
/// Windows are aligned to the interval (a 1-MINUTE series closes on the
/// minute). The closing bar carries `ts_event` of the boundary, not of the
/// tick that triggered it. Windows that see no ticks emit nothing and the
/// window re-anchors to the next tick's interval.
pub struct TimeBarAggregator {
    core: AggregatorCore,
    interval_ns: u64,
    open_ns: u64,
    close_ns: u64,
}

impl TimeBarAggregator {
    pub fn new(bar_type: BarType, clock: Arc<dyn Clock>) -> AggregationResult<Self> {
        let interval_ns = bar_type.spec.timedelta_ns().unwrap_or(0);
        let core = AggregatorCore::new_time_driven(bar_type, clock)?;
        Ok(Self {
            core,
            interval_ns,
            open_ns: 0,
            close_ns: 0,
        })
    }

    /// The current accumulation window as `(open_ns, close_ns)`, once
    /// anchored by the first tick.
    pub fn window(&self) -> Option<(u64, u64)> {
        (self.close_ns > 0).then_some((self.open_ns, self.close_ns))
    }

    fn anchor(&mut self, ts_event: u64) {
        self.open_ns = (ts_event / self.interval_ns) * self.interval_ns;
        self.close_ns = self.open_ns + self.interval_ns;
    }

    fn apply(&mut self, price: Price, size: Quantity, ts_event: u64) -> AggregationResult<Vec<Bar>> {
        if self.close_ns == 0 {
            self.anchor(ts_event);
        }
        let mut bars = Vec::new();
        while ts_event >= self.close_ns {
            if self.core.builder.is_initialized() {
                let bar = self.core.build(self.close_ns)?;
                debug!("closed time bar {bar}");
                bars.push(bar);
                self.open_ns = self.close_ns;
                self.close_ns += self.interval_ns;
            } else {
                self.anchor(ts_event);
            }
        }
        self.core.builder.update(price, size, ts_event)?;
        Ok(bars)
    }
}

impl BarAggregator for TimeBarAggregator {
    fn bar_type(&self) -> &BarType {
        self.core.bar_type()
    }

    fn handle_quote(&mut self, quote: &QuoteTick) -> AggregationResult<Vec<Bar>> {
        match self.core.quote_inputs(quote)? {
            Some((price, size)) => self.apply(price, size, quote.ts_event),
            None => Ok(Vec::new()),
        }
    }

    fn handle_trade(&mut self, trade: &TradeTick) -> AggregationResult<Vec<Bar>> {
        if self.core.takes_trades() {
            return self.apply(trade.price, trade.size, trade.ts_event);
        }
        Ok(Vec::new())
    }
}
