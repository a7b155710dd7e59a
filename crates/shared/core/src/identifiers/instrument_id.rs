//! Venue-qualified instrument identifier.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Symbol, Venue};
use crate::errors::IdentifierError;

/// A symbol qualified by the venue it trades on, written `SYMBOL.VENUE`.
///
/// The string form carries exactly one dot; parsing rejects anything else.
/// Both components are interned, so an `InstrumentId` is two pointer-sized
/// handles and copies are cheap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentId {
    symbol: Symbol,
    venue: Venue,
}

impl InstrumentId {
    pub fn new(symbol: Symbol, venue: Venue) -> Self {
        Self { symbol, venue }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }
}

impl FromStr for InstrumentId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.matches('.').count() != 1 {
            return Err(IdentifierError::MalformedInstrumentId(s.to_string()));
        }
        let (symbol_str, venue_str) = s
            .split_once('.')
            .ok_or_else(|| IdentifierError::MalformedInstrumentId(s.to_string()))?;
        if symbol_str.is_empty() || venue_str.is_empty() {
            return Err(IdentifierError::MalformedInstrumentId(s.to_string()));
        }
        Ok(Self {
            symbol: Symbol::new(symbol_str)?,
            venue: Venue::new(venue_str)?,
        })
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.venue)
    }
}

impl Serialize for InstrumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstrumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
