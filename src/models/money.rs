use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CENTS_PER_UNIT: i64 = 100;
const MAX_FRACTION_DIGITS: usize = 2;
/// Ten significant digits with two after the point: 99,999,999.99.
pub const MAX_CENTS: i64 = 9_999_999_999;

/// Monetary amount with two fractional digits, held as a count of cents.
///
/// Serialized as a decimal string (`"1250.00"`). Deserialization also accepts
/// a JSON number, rounded to the nearest cent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be empty")]
    Empty,
    #[error("amount {0:?} is not a decimal number")]
    Malformed(String),
    #[error("amount {0:?} has more than two fractional digits")]
    TooPrecise(String),
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(MAX_CENTS);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn exceeds_max(self) -> bool {
        self.0 > MAX_CENTS || self.0 < -MAX_CENTS
    }

    pub fn parse(value: &str) -> Result<Self, AmountError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
        {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let out_of_range = || AmountError::OutOfRange(trimmed.to_string());
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| out_of_range())?
        };
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| out_of_range())?,
        };

        let cents = whole_units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|value| value.checked_add(fraction_cents))
            .filter(|cents| *cents <= MAX_CENTS)
            .ok_or_else(out_of_range)?;
        Ok(Self(if negative { -cents } else { cents }))
    }

    fn from_float(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Malformed(value.to_string()));
        }
        Self::parse(&format!("{value:.2}"))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let per_unit = CENTS_PER_UNIT as u64;
        write!(
            f,
            "{sign}{}.{:02}",
            magnitude / per_unit,
            magnitude % per_unit
        )
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Amount::parse(&text),
            Raw::Number(number) => Amount::from_float(number),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
