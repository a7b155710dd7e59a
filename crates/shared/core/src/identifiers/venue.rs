//! Trading venue identifier.

use crate::identifiers::{identifier, MAX_ID_LEN};

identifier!(
    /// A trading venue or exchange code, e.g. `"BINANCE"` or `"XNAS"`.
    Venue,
    MAX_ID_LEN
);
