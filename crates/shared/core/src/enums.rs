//! Wire-stable enumerations.
//!
//! Every enum here has a stable string form and a stable integer
//! discriminant; both are part of the persistence format. String conversion
//! is exact and case-sensitive, and the discriminant 0 is reserved for the
//! "none/unspecified" variant where one exists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValueError;

/// Side of an order or book ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OrderSide {
    NoOrderSide = 0,
    Buy = 1,
    Sell = 2,
}

impl OrderSide {
    /// Returns the opposite side; `NoOrderSide` is its own opposite.
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::NoOrderSide => OrderSide::NoOrderSide,
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// Returns true for `Buy` or `Sell`.
    pub fn is_specified(&self) -> bool {
        !matches!(self, OrderSide::NoOrderSide)
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderSide::NoOrderSide => "NO_ORDER_SIDE",
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderSide {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_ORDER_SIDE" => Ok(OrderSide::NoOrderSide),
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(unknown("OrderSide", s)),
        }
    }
}

impl TryFrom<u8> for OrderSide {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderSide::NoOrderSide),
            1 => Ok(OrderSide::Buy),
            2 => Ok(OrderSide::Sell),
            _ => Err(unknown("OrderSide", &value.to_string())),
        }
    }
}

/// The side that crossed the spread to execute a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AggressorSide {
    None = 0,
    Buyer = 1,
    Seller = 2,
}

impl fmt::Display for AggressorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AggressorSide::None => "NONE",
            AggressorSide::Buyer => "BUYER",
            AggressorSide::Seller => "SELLER",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AggressorSide {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(AggressorSide::None),
            "BUYER" => Ok(AggressorSide::Buyer),
            "SELLER" => Ok(AggressorSide::Seller),
            _ => Err(unknown("AggressorSide", s)),
        }
    }
}

impl TryFrom<u8> for AggressorSide {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AggressorSide::None),
            1 => Ok(AggressorSide::Buyer),
            2 => Ok(AggressorSide::Seller),
            _ => Err(unknown("AggressorSide", &value.to_string())),
        }
    }
}

/// Kind of change carried by an order book delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BookAction {
    Add = 1,
    Update = 2,
    Delete = 3,
    Clear = 4,
}

impl fmt::Display for BookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookAction::Add => "ADD",
            BookAction::Update => "UPDATE",
            BookAction::Delete => "DELETE",
            BookAction::Clear => "CLEAR",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BookAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(BookAction::Add),
            "UPDATE" => Ok(BookAction::Update),
            "DELETE" => Ok(BookAction::Delete),
            "CLEAR" => Ok(BookAction::Clear),
            _ => Err(unknown("BookAction", s)),
        }
    }
}

impl TryFrom<u8> for BookAction {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BookAction::Add),
            2 => Ok(BookAction::Update),
            3 => Ok(BookAction::Delete),
            4 => Ok(BookAction::Clear),
            _ => Err(unknown("BookAction", &value.to_string())),
        }
    }
}

/// Granularity of an order book.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BookType {
    /// Top-of-book best bid/offer only.
    L1_TBBO = 1,
    /// Aggregated market-by-price levels.
    L2_MBP = 2,
    /// Full market-by-order book.
    L3_MBO = 3,
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookType::L1_TBBO => "L1_TBBO",
            BookType::L2_MBP => "L2_MBP",
            BookType::L3_MBO => "L3_MBO",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BookType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L1_TBBO" => Ok(BookType::L1_TBBO),
            "L2_MBP" => Ok(BookType::L2_MBP),
            "L3_MBO" => Ok(BookType::L3_MBO),
            _ => Err(unknown("BookType", s)),
        }
    }
}

impl TryFrom<u8> for BookType {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BookType::L1_TBBO),
            2 => Ok(BookType::L2_MBP),
            3 => Ok(BookType::L3_MBO),
            _ => Err(unknown("BookType", &value.to_string())),
        }
    }
}

/// Which price a consumer extracts from a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PriceType {
    Bid = 1,
    Ask = 2,
    Mid = 3,
    Last = 4,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceType::Bid => "BID",
            PriceType::Ask => "ASK",
            PriceType::Mid => "MID",
            PriceType::Last => "LAST",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PriceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BID" => Ok(PriceType::Bid),
            "ASK" => Ok(PriceType::Ask),
            "MID" => Ok(PriceType::Mid),
            "LAST" => Ok(PriceType::Last),
            _ => Err(unknown("PriceType", s)),
        }
    }
}

impl TryFrom<u8> for PriceType {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriceType::Bid),
            2 => Ok(PriceType::Ask),
            3 => Ok(PriceType::Mid),
            4 => Ok(PriceType::Last),
            _ => Err(unknown("PriceType", &value.to_string())),
        }
    }
}

/// Dimension a bar accumulates over before it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BarAggregation {
    Tick = 1,
    Volume = 2,
    Value = 3,
    Second = 4,
    Minute = 5,
    Hour = 6,
    Day = 7,
}

impl BarAggregation {
    /// Returns true for the wall-clock driven aggregations.
    pub fn is_time_driven(&self) -> bool {
        matches!(
            self,
            BarAggregation::Second | BarAggregation::Minute | BarAggregation::Hour | BarAggregation::Day
        )
    }
}

impl fmt::Display for BarAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BarAggregation::Tick => "TICK",
            BarAggregation::Volume => "VOLUME",
            BarAggregation::Value => "VALUE",
            BarAggregation::Second => "SECOND",
            BarAggregation::Minute => "MINUTE",
            BarAggregation::Hour => "HOUR",
            BarAggregation::Day => "DAY",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BarAggregation {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TICK" => Ok(BarAggregation::Tick),
            "VOLUME" => Ok(BarAggregation::Volume),
            "VALUE" => Ok(BarAggregation::Value),
            "SECOND" => Ok(BarAggregation::Second),
            "MINUTE" => Ok(BarAggregation::Minute),
            "HOUR" => Ok(BarAggregation::Hour),
            "DAY" => Ok(BarAggregation::Day),
            _ => Err(unknown("BarAggregation", s)),
        }
    }
}

impl TryFrom<u8> for BarAggregation {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BarAggregation::Tick),
            2 => Ok(BarAggregation::Volume),
            3 => Ok(BarAggregation::Value),
            4 => Ok(BarAggregation::Second),
            5 => Ok(BarAggregation::Minute),
            6 => Ok(BarAggregation::Hour),
            7 => Ok(BarAggregation::Day),
            _ => Err(unknown("BarAggregation", &value.to_string())),
        }
    }
}

/// Whether a bar was synthesized locally or received from a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AggregationSource {
    External = 1,
    Internal = 2,
}

impl fmt::Display for AggregationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AggregationSource::External => "EXTERNAL",
            AggregationSource::Internal => "INTERNAL",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AggregationSource {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXTERNAL" => Ok(AggregationSource::External),
            "INTERNAL" => Ok(AggregationSource::Internal),
            _ => Err(unknown("AggregationSource", s)),
        }
    }
}

impl TryFrom<u8> for AggregationSource {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AggregationSource::External),
            2 => Ok(AggregationSource::Internal),
            _ => Err(unknown("AggregationSource", &value.to_string())),
        }
    }
}

/// Broad class of a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CurrencyKind {
    Fiat = 1,
    Crypto = 2,
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CurrencyKind::Fiat => "FIAT",
            CurrencyKind::Crypto => "CRYPTO",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CurrencyKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIAT" => Ok(CurrencyKind::Fiat),
            "CRYPTO" => Ok(CurrencyKind::Crypto),
            _ => Err(unknown("CurrencyKind", s)),
        }
    }
}

fn unknown(kind: &'static str, value: &str) -> ValueError {
    ValueError::UnknownEnumValue {
        kind,
        value: value.to_string(),
    }
}
