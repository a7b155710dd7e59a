//! Bars and their type descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hermes_core::{
    AggregationSource, BarAggregation, InstrumentId, Price, PriceType, Quantity, ValueError,
    ValueResult,
};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// How a bar series accumulates: the step count over an aggregation
/// dimension, and which quote price feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarSpecification {
    pub step: usize,
    pub aggregation: BarAggregation,
    pub price_type: PriceType,
}

impl BarSpecification {
    pub fn new(
        step: usize,
        aggregation: BarAggregation,
        price_type: PriceType,
    ) -> ValueResult<Self> {
        if step == 0 {
            return Err(ValueError::Validation(
                "bar specification step must be positive".to_string(),
            ));
        }
        Ok(Self {
            step,
            aggregation,
            price_type,
        })
    }

    /// Window length in nanoseconds for the time-driven aggregations.
    pub fn timedelta_ns(&self) -> Option<u64> {
        let unit = match self.aggregation {
            BarAggregation::Second => NANOS_PER_SEC,
            BarAggregation::Minute => 60 * NANOS_PER_SEC,
            BarAggregation::Hour => 3_600 * NANOS_PER_SEC,
            BarAggregation::Day => 86_400 * NANOS_PER_SEC,
            _ => return None,
        };
        Some(self.step as u64 * unit)
    }
}

impl fmt::Display for BarSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.step, self.aggregation, self.price_type)
    }
}

/// Fully-qualified bar series identity.
///
/// String form: `"BTCUSDT.BINANCE-1-MINUTE-LAST-INTERNAL"`. Parsing works
/// from the right so instrument symbols may themselves contain hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarType {
    pub instrument_id: InstrumentId,
    pub spec: BarSpecification,
    pub aggregation_source: AggregationSource,
}

impl BarType {
    pub fn new(
        instrument_id: InstrumentId,
        spec: BarSpecification,
        aggregation_source: AggregationSource,
    ) -> Self {
        Self {
            instrument_id,
            spec,
            aggregation_source,
        }
    }
}

impl fmt::Display for BarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.instrument_id, self.spec, self.aggregation_source
        )
    }
}

impl FromStr for BarType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pieces = s.rsplitn(5, '-');
        let source_str = pieces.next();
        let price_type_str = pieces.next();
        let aggregation_str = pieces.next();
        let step_str = pieces.next();
        let instrument_str = pieces.next();
        match (
            instrument_str,
            step_str,
            aggregation_str,
            price_type_str,
            source_str,
        ) {
            (Some(instrument), Some(step), Some(aggregation), Some(price_type), Some(source)) => {
                let instrument_id: InstrumentId = instrument.parse()?;
                let step: usize = step.parse().map_err(|_| {
                    ValueError::Validation(format!("invalid bar step: {step:?}"))
                })?;
                let spec = BarSpecification::new(step, aggregation.parse()?, price_type.parse()?)?;
                Ok(Self::new(instrument_id, spec, source.parse()?))
            }
            _ => Err(ValueError::Validation(format!(
                "malformed bar type string: {s:?}"
            ))),
        }
    }
}

/// One aggregated bar.
///
/// Invariants, checked at construction: `low <= open, close <= high` and
/// the local timestamp is never earlier than the event timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bar {
    pub bar_type: BarType,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Quantity,
    /// Close boundary (time bars) or last-tick time in nanoseconds.
    pub ts_event: u64,
    /// Local emit time in nanoseconds since the UNIX epoch.
    pub ts_init: u64,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bar_type: BarType,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        if high < low {
            return Err(ValueError::Validation(format!(
                "bar high {high} below low {low}"
            )));
        }
        if open < low || open > high {
            return Err(ValueError::Validation(format!(
                "bar open {open} outside [{low}, {high}]"
            )));
        }
        if close < low || close > high {
            return Err(ValueError::Validation(format!(
                "bar close {close} outside [{low}, {high}]"
            )));
        }
        if ts_init < ts_event {
            return Err(ValueError::Validation(format!(
                "ts_init {ts_init} earlier than ts_event {ts_event}"
            )));
        }
        Ok(Self {
            bar_type,
            open,
            high,
            low,
            close,
            volume,
            ts_event,
            ts_init,
        })
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} o={} h={} l={} c={} v={} ts={}",
            self.bar_type, self.open, self.high, self.low, self.close, self.volume, self.ts_event
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_bar_type() -> BarType {
        BarType::new(
            "BTCUSDT.BINANCE".parse().unwrap(),
            BarSpecification::new(1, BarAggregation::Minute, PriceType::Last).unwrap(),
            AggregationSource::Internal,
        )
    }

    #[test]
    fn test_spec_rejects_zero_step() {
        assert!(BarSpecification::new(0, BarAggregation::Tick, PriceType::Last).is_err());
    }

    #[test]
    fn test_timedelta() {
        let spec = BarSpecification::new(5, BarAggregation::Minute, PriceType::Last).unwrap();
        assert_eq!(spec.timedelta_ns(), Some(300 * NANOS_PER_SEC));
        let spec = BarSpecification::new(100, BarAggregation::Tick, PriceType::Last).unwrap();
        assert_eq!(spec.timedelta_ns(), None);
    }

    #[test]
    fn test_bar_type_string_round_trip() {
        let bar_type = minute_bar_type();
        let s = bar_type.to_string();
        assert_eq!(s, "BTCUSDT.BINANCE-1-MINUTE-LAST-INTERNAL");
        let back: BarType = s.parse().unwrap();
        assert_eq!(back, bar_type);
    }

    #[test]
    fn test_bar_type_parse_hyphenated_symbol() {
        let back: BarType = "BTC-PERP.DERIBIT-15-SECOND-MID-EXTERNAL".parse().unwrap();
        assert_eq!(back.instrument_id.symbol().as_str(), "BTC-PERP");
        assert_eq!(back.spec.step, 15);
        assert_eq!(back.spec.aggregation, BarAggregation::Second);
        assert_eq!(back.aggregation_source, AggregationSource::External);
    }

    #[test]
    fn test_bar_type_parse_rejects_malformed() {
        assert!("BTCUSDT.BINANCE-1-MINUTE".parse::<BarType>().is_err());
        assert!("BTCUSDT.BINANCE-x-MINUTE-LAST-INTERNAL"
            .parse::<BarType>()
            .is_err());
        assert!("BTCUSDT.BINANCE-1-WEEK-LAST-INTERNAL"
            .parse::<BarType>()
            .is_err());
    }

    #[test]
    fn test_bar_invariants() {
        let ok = Bar::new(
            minute_bar_type(),
            "10".parse().unwrap(),
            "12".parse().unwrap(),
            "9".parse().unwrap(),
            "11".parse().unwrap(),
            "100".parse().unwrap(),
            60,
            61,
        );
        assert!(ok.is_ok());

        let bad_high = Bar::new(
            minute_bar_type(),
            "10".parse().unwrap(),
            "9".parse().unwrap(),
            "10".parse().unwrap(),
            "10".parse().unwrap(),
            "100".parse().unwrap(),
            60,
            61,
        );
        assert!(bad_high.is_err());

        let open_outside = Bar::new(
            minute_bar_type(),
            "13".parse().unwrap(),
            "12".parse().unwrap(),
            "9".parse().unwrap(),
            "11".parse().unwrap(),
            "100".parse().unwrap(),
            60,
            61,
        );
        assert!(open_outside.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let bar = Bar::new(
            minute_bar_type(),
            "10.0".parse().unwrap(),
            "12.0".parse().unwrap(),
            "9.0".parse().unwrap(),
            "11.0".parse().unwrap(),
            "100.5".parse().unwrap(),
            60_000,
            61_000,
        )
        .unwrap();
        let json = serde_json::to_string(&bar).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bar);
    }
}
