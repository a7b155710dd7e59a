//! Top-of-book quote event.

use std::fmt;

use serde::{Deserialize, Serialize};

use hermes_core::{
    InstrumentId, Price, PriceType, Quantity, ValueError, ValueResult, FIXED_PRECISION,
};

/// A best bid/offer update for one instrument.
///
/// Invariants, checked at construction: `bid <= ask`, the two prices share
/// one precision, the two sizes share one precision, and the local
/// timestamp is never earlier than the venue timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteTick {
    pub instrument_id: InstrumentId,
    pub bid: Price,
    pub ask: Price,
    pub bid_size: Quantity,
    pub ask_size: Quantity,
    /// Venue event time in nanoseconds since the UNIX epoch.
    pub ts_event: u64,
    /// Local ingestion time in nanoseconds since the UNIX epoch.
    pub ts_init: u64,
}

impl QuoteTick {
    pub fn new(
        instrument_id: InstrumentId,
        bid: Price,
        ask: Price,
        bid_size: Quantity,
        ask_size: Quantity,
        ts_event: u64,
        ts_init: u64,
    ) -> ValueResult<Self> {
        if bid.precision() != ask.precision() {
            return Err(ValueError::PrecisionMismatch {
                lhs: bid.precision(),
                rhs: ask.precision(),
            });
        }
        if bid_size.precision() != ask_size.precision() {
            return Err(ValueError::PrecisionMismatch {
                lhs: bid_size.precision(),
                rhs: ask_size.precision(),
            });
        }
        if bid > ask {
            return Err(ValueError::Validation(format!(
                "crossed quote: bid {bid} > ask {ask}"
            )));
        }
        if ts_init < ts_event {
            return Err(ValueError::Validation(format!(
                "ts_init {ts_init} earlier than ts_event {ts_event}"
            )));
        }
        Ok(Self {
            instrument_id,
            bid,
            ask,
            bid_size,
            ask_size,
            ts_event,
            ts_init,
        })
    }

    /// The price a consumer of `price_type` reads from this quote.
    ///
    /// MID gains one digit of precision (capped at 9) so the half-spread
    /// survives the projection. LAST is not derivable from a quote.
    pub fn extract_price(&self, price_type: PriceType) -> ValueResult<Price> {
        match price_type {
            PriceType::Bid => Ok(self.bid),
            PriceType::Ask => Ok(self.ask),
            PriceType::Mid => {
                let precision =
                    (self.bid.precision().max(self.ask.precision()) + 1).min(FIXED_PRECISION);
                let mid = (i128::from(self.bid.raw()) + i128::from(self.ask.raw())) / 2;
                // the half-sum of two in-range prices is always in range
                Price::from_raw(mid as i64, precision)
            }
            PriceType::Last => Err(ValueError::Validation(
                "LAST price is not derivable from a quote".to_string(),
            )),
        }
    }

    /// The size paired with [`Self::extract_price`].
    pub fn extract_size(&self, price_type: PriceType) -> ValueResult<Quantity> {
        match price_type {
            PriceType::Bid => Ok(self.bid_size),
            PriceType::Ask => Ok(self.ask_size),
            PriceType::Mid => {
                let precision = (self.bid_size.precision().max(self.ask_size.precision()) + 1)
                    .min(FIXED_PRECISION);
                let avg =
                    (u128::from(self.bid_size.raw()) + u128::from(self.ask_size.raw())) / 2;
                Quantity::from_raw(avg as u64, precision)
            }
            PriceType::Last => Err(ValueError::Validation(
                "LAST size is not derivable from a quote".to_string(),
            )),
        }
    }
}

impl fmt::Display for QuoteTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{} @ {}/{} ts={}",
            self.instrument_id, self.bid_size, self.ask_size, self.bid, self.ask, self.ts_event
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument() -> InstrumentId {
        "EURUSD.SIM".parse().unwrap()
    }

    fn quote() -> QuoteTick {
        QuoteTick::new(
            instrument(),
            "1.2344".parse().unwrap(),
            "1.2346".parse().unwrap(),
            "100000".parse().unwrap(),
            "200000".parse().unwrap(),
            1_000,
            1_500,
        )
        .unwrap()
    }

    #[test]
    fn test_new_valid() {
        let q = quote();
        assert_eq!(q.bid.to_string(), "1.2344");
        assert_eq!(q.ts_init, 1_500);
    }

    #[test]
    fn test_rejects_crossed() {
        let result = QuoteTick::new(
            instrument(),
            "1.2347".parse().unwrap(),
            "1.2346".parse().unwrap(),
            "1".parse().unwrap(),
            "1".parse().unwrap(),
            0,
            0,
        );
        assert!(matches!(result, Err(ValueError::Validation(_))));
    }

    #[test]
    fn test_rejects_precision_mismatch() {
        let result = QuoteTick::new(
            instrument(),
            "1.234".parse().unwrap(),
            "1.2346".parse().unwrap(),
            "1".parse().unwrap(),
            "1".parse().unwrap(),
            0,
            0,
        );
        assert!(matches!(result, Err(ValueError::PrecisionMismatch { .. })));
    }

    #[test]
    fn test_rejects_time_travel() {
        let result = QuoteTick::new(
            instrument(),
            "1.0".parse().unwrap(),
            "1.1".parse().unwrap(),
            "1".parse().unwrap(),
            "1".parse().unwrap(),
            2_000,
            1_000,
        );
        assert!(matches!(result, Err(ValueError::Validation(_))));
    }

    #[test]
    fn test_extract_price() {
        let q = quote();
        assert_eq!(q.extract_price(PriceType::Bid).unwrap(), q.bid);
        assert_eq!(q.extract_price(PriceType::Ask).unwrap(), q.ask);
        let mid = q.extract_price(PriceType::Mid).unwrap();
        assert_eq!(mid.to_string(), "1.23450");
        assert_eq!(mid.precision(), 5);
        assert!(q.extract_price(PriceType::Last).is_err());
    }

    #[test]
    fn test_extract_size_mid_averages() {
        let q = quote();
        let size = q.extract_size(PriceType::Mid).unwrap();
        assert_eq!(size.to_string(), "150000.0");
    }

    #[test]
    fn test_serde_round_trip() {
        let q = quote();
        let json = serde_json::to_string(&q).unwrap();
        let back: QuoteTick = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
