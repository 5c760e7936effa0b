//! Arbitrary-precision integers as carried on the wire.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A signed integer of unbounded magnitude.
///
/// Stored as a sign plus canonical decimal digits: no leading zeros, and zero
/// is never negative. The codec never does arithmetic on integers, so the
/// decimal form is both the wire form and the comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    negative: bool,
    digits: String,
}

/// Error returned when text is not a decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid integer literal")]
pub struct ParseIntegerError;

impl Integer {
    /// Parses `-?[0-9]+` from raw bytes.
    pub fn parse(text: &[u8]) -> Result<Self, ParseIntegerError> {
        let (negative, digits) = match text.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, text),
        };
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(ParseIntegerError);
        }

        let first_significant = digits
            .iter()
            .position(|&d| d != b'0')
            .unwrap_or(digits.len());
        let significant = &digits[first_significant..];
        if significant.is_empty() {
            return Ok(Self::zero());
        }

        Ok(Self {
            negative,
            // Only ASCII digits remain, so the bytes are valid UTF-8.
            digits: significant.iter().map(|&d| char::from(d)).collect(),
        })
    }

    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: "0".to_owned(),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    /// The decimal digits of the magnitude, without sign.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    fn from_magnitude(negative: bool, magnitude: u128) -> Self {
        Self {
            negative: negative && magnitude != 0,
            digits: magnitude.to_string(),
        }
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl Default for Integer {
    fn default() -> Self {
        Self::zero()
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

impl FromStr for Integer {
    type Err = ParseIntegerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(value: $t) -> Self {
                Self::from_magnitude(false, u128::from(value))
            }
        }
    )*};
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(value: $t) -> Self {
                let wide = i128::from(value);
                Self::from_magnitude(wide < 0, wide.unsigned_abs())
            }
        }
    )*};
}

from_unsigned!(u8, u16, u32, u64, u128);
from_signed!(i8, i16, i32, i64, i128);

impl From<usize> for Integer {
    fn from(value: usize) -> Self {
        Self::from_magnitude(false, value as u128)
    }
}

impl TryFrom<&Integer> for i128 {
    type Error = ParseIntegerError;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.to_string().parse().map_err(|_| ParseIntegerError)
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = ParseIntegerError;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.to_string().parse().map_err(|_| ParseIntegerError)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = ParseIntegerError;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        if value.negative {
            return Err(ParseIntegerError);
        }
        value.digits.parse().map_err(|_| ParseIntegerError)
    }
}
