//! Currency definitions and the process-wide registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::fixed;
use crate::enums::CurrencyKind;
use crate::errors::{ValueError, ValueResult};

static REGISTRY: OnceLock<DashMap<String, Currency>> = OnceLock::new();

fn registry() -> &'static DashMap<String, Currency> {
    REGISTRY.get_or_init(|| {
        let map = DashMap::new();
        for currency in builtin_currencies() {
            map.insert(currency.code().to_string(), currency);
        }
        map
    })
}

/// A fiat or crypto currency.
///
/// Currencies are identified by code: two values with the same code are the
/// same currency regardless of how they were obtained. The process-wide
/// registry resolves codes at the I/O boundary and is seeded lazily with the
/// common fiat and crypto entries; venue adapters may add more through
/// [`Currency::register`].
#[derive(Debug, Clone)]
pub struct Currency {
    code: Arc<str>,
    precision: u8,
    iso4217: u16,
    name: Arc<str>,
    kind: CurrencyKind,
}

impl Currency {
    /// Define a currency. The code must be 1..=16 characters with no
    /// whitespace; precision is capped at 9.
    pub fn new(
        code: &str,
        precision: u8,
        iso4217: u16,
        name: &str,
        kind: CurrencyKind,
    ) -> ValueResult<Self> {
        fixed::check_precision(precision)?;
        if code.is_empty() || code.len() > 16 || code.chars().any(char::is_whitespace) {
            return Err(ValueError::Validation(format!(
                "invalid currency code: {code:?}"
            )));
        }
        Ok(Self {
            code: Arc::from(code),
            precision,
            iso4217,
            name: Arc::from(name),
            kind,
        })
    }

    /// Look a currency up by code in the process registry.
    pub fn from_code(code: &str) -> Option<Currency> {
        registry().get(code).map(|entry| entry.clone())
    }

    /// Insert a currency into the process registry, returning any previous
    /// definition under the same code.
    pub fn register(currency: Currency) -> Option<Currency> {
        registry().insert(currency.code.to_string(), currency)
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    #[inline]
    pub const fn iso4217(&self) -> u16 {
        self.iso4217
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn kind(&self) -> CurrencyKind {
        self.kind
    }

    #[inline]
    pub fn is_fiat(&self) -> bool {
        self.kind == CurrencyKind::Fiat
    }

    #[inline]
    pub fn is_crypto(&self) -> bool {
        self.kind == CurrencyKind::Crypto
    }

    pub fn usd() -> Self {
        Self {
            code: Arc::from("USD"),
            precision: 2,
            iso4217: 840,
            name: Arc::from("United States dollar"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn eur() -> Self {
        Self {
            code: Arc::from("EUR"),
            precision: 2,
            iso4217: 978,
            name: Arc::from("Euro"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn gbp() -> Self {
        Self {
            code: Arc::from("GBP"),
            precision: 2,
            iso4217: 826,
            name: Arc::from("Pound sterling"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn jpy() -> Self {
        Self {
            code: Arc::from("JPY"),
            precision: 0,
            iso4217: 392,
            name: Arc::from("Japanese yen"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn aud() -> Self {
        Self {
            code: Arc::from("AUD"),
            precision: 2,
            iso4217: 36,
            name: Arc::from("Australian dollar"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn cad() -> Self {
        Self {
            code: Arc::from("CAD"),
            precision: 2,
            iso4217: 124,
            name: Arc::from("Canadian dollar"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn chf() -> Self {
        Self {
            code: Arc::from("CHF"),
            precision: 2,
            iso4217: 756,
            name: Arc::from("Swiss franc"),
            kind: CurrencyKind::Fiat,
        }
    }

    pub fn btc() -> Self {
        Self {
            code: Arc::from("BTC"),
            precision: 8,
            iso4217: 0,
            name: Arc::from("Bitcoin"),
            kind: CurrencyKind::Crypto,
        }
    }

    pub fn eth() -> Self {
        Self {
            code: Arc::from("ETH"),
            precision: 9,
            iso4217: 0,
            name: Arc::from("Ether"),
            kind: CurrencyKind::Crypto,
        }
    }

    pub fn usdt() -> Self {
        Self {
            code: Arc::from("USDT"),
            precision: 6,
            iso4217: 0,
            name: Arc::from("Tether"),
            kind: CurrencyKind::Crypto,
        }
    }

    pub fn usdc() -> Self {
        Self {
            code: Arc::from("USDC"),
            precision: 6,
            iso4217: 0,
            name: Arc::from("USD Coin"),
            kind: CurrencyKind::Crypto,
        }
    }

    pub fn sol() -> Self {
        Self {
            code: Arc::from("SOL"),
            precision: 9,
            iso4217: 0,
            name: Arc::from("Solana"),
            kind: CurrencyKind::Crypto,
        }
    }
}

fn builtin_currencies() -> Vec<Currency> {
    vec![
        Currency::usd(),
        Currency::eur(),
        Currency::gbp(),
        Currency::jpy(),
        Currency::aud(),
        Currency::cad(),
        Currency::chf(),
        Currency::btc(),
        Currency::eth(),
        Currency::usdt(),
        Currency::usdc(),
        Currency::sol(),
    ]
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.code, &other.code) || self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl FromStr for Currency {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
            .ok_or_else(|| ValueError::Validation(format!("unknown currency code: {s:?}")))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}
