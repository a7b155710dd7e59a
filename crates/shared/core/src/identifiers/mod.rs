//! Interned identifier newtypes.
//!
//! Every identifier wraps a reference-counted interned string: copies are
//! O(1), equality short-circuits on pointer identity, and hashing and
//! ordering are by content. Construction validates (non-empty, no
//! whitespace, bounded length) and then interns in a per-type pool that
//! lives for the process lifetime.

mod instrument_id;
mod interner;
mod symbol;
mod venue;

pub use instrument_id::InstrumentId;
pub(crate) use interner::Interner;
pub use symbol::Symbol;
pub use venue::Venue;

use crate::errors::IdentifierError;

/// Default maximum identifier length in characters.
pub(crate) const MAX_ID_LEN: usize = 36;

/// Extended maximum for venue-assigned ids, which routinely run longer.
pub(crate) const MAX_VENUE_ASSIGNED_LEN: usize = 64;

pub(crate) fn validate(value: &str, max_len: usize) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdentifierError::ContainsWhitespace(value.to_string()));
    }
    if value.chars().count() > max_len {
        return Err(IdentifierError::TooLong {
            value: value.to_string(),
            max: max_len,
        });
    }
    Ok(())
}

/// Defines an interned identifier newtype with its own pool.
macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $max_len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(std::sync::Arc<str>);

        impl $name {
            /// Validate and intern `value`.
            pub fn new(value: &str) -> Result<Self, $crate::errors::IdentifierError> {
                $crate::identifiers::validate(value, $max_len)?;
                Ok(Self(Self::interner().intern(value)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            fn interner() -> &'static $crate::identifiers::Interner {
                static POOL: std::sync::OnceLock<$crate::identifiers::Interner> =
                    std::sync::OnceLock::new();
                POOL.get_or_init($crate::identifiers::Interner::new)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                std::sync::Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.0, state);
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let value = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::new(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use identifier;

identifier!(
    /// Identifier of a trader, by convention `NAME-TAG`.
    TraderId,
    MAX_ID_LEN
);

identifier!(
    /// Identifier of a strategy instance, by convention `NAME-TAG`.
    StrategyId,
    MAX_ID_LEN
);

identifier!(
    /// Identifier of a brokerage or exchange account.
    AccountId,
    MAX_ID_LEN
);

identifier!(
    /// Client-assigned order identifier.
    ClientOrderId,
    MAX_VENUE_ASSIGNED_LEN
);

identifier!(
    /// Venue-assigned order identifier.
    VenueOrderId,
    MAX_VENUE_ASSIGNED_LEN
);

identifier!(
    /// Identifier of an open position.
    PositionId,
    MAX_ID_LEN
);

identifier!(
    /// Venue-assigned trade/match identifier.
    TradeId,
    MAX_VENUE_ASSIGNED_LEN
);

impl TraderId {
    /// The tag after the last hyphen, e.g. `"001"` for `"TRADER-001"`.
    pub fn get_tag(&self) -> &str {
        self.as_str().rsplit('-').next().unwrap_or_default()
    }
}

impl StrategyId {
    /// The tag after the last hyphen, e.g. `"EMA"` for `"SCALPER-EMA"`.
    pub fn get_tag(&self) -> &str {
        self.as_str().rsplit('-').next().unwrap_or_default()
    }
}
