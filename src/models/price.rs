use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A decimal amount with at most 5 digits, 2 of them after the point.
/// Kept as whole cents so it round-trips through any SQL backend unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

const MAX_DIGITS: usize = 5;
const DECIMAL_PLACES: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PriceError {
    #[error("A valid number is required.")]
    Invalid,
    #[error("Ensure that there are no more than 5 digits in total.")]
    MaxDigits,
    #[error("Ensure that there are no more than 2 decimal places.")]
    DecimalPlaces,
    #[error("Ensure that there are no more than 3 digits before the decimal point.")]
    WholeDigits,
}

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(PriceError::Invalid);
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() + frac.len() > MAX_DIGITS {
            return Err(PriceError::MaxDigits);
        }
        if frac.len() > DECIMAL_PLACES {
            return Err(PriceError::DecimalPlaces);
        }
        if whole.len() > MAX_DIGITS - DECIMAL_PLACES {
            return Err(PriceError::WholeDigits);
        }

        // At most three whole digits and two decimals, so these parses cannot overflow.
        let units: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| PriceError::Invalid)? };
        let cents: i64 = format!("{:0<2}", frac).parse().map_err(|_| PriceError::Invalid)?;
        let total = units * 100 + cents;

        Ok(Price(if negative { -total } else { total }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Raw price as it arrives in a request body: either `"5.50"` or `5.5`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    pub fn parse(&self) -> Result<Price, PriceError> {
        match self {
            PriceInput::Text(s) => s.parse(),
            PriceInput::Number(n) => n.to_string().parse(),
        }
    }
}
