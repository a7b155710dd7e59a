//! Ticker symbol identifier.

use crate::identifiers::{identifier, MAX_ID_LEN};

identifier!(
    /// A venue-native ticker symbol, e.g. `"BTCUSDT"` or `"AAPL"`.
    Symbol,
    MAX_ID_LEN
);
