// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt::{self, Debug, Display, Formatter};
use core::str::FromStr;

use num_bigint::BigInt as NumBigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use serde::ser::Serializer;
use serde::Serialize;

use crate::*;

pub type BigInt = NumBigInt;

// Largest decimal exponent kept exactly. Literals beyond it are rejected.
const MAX_EXPONENT: u32 = 4096;

/// A non-integral decimal, `digits * 10^-scale`.
///
/// Always normalised: `scale > 0` and `digits` is not a multiple of ten, so
/// two decimals are equal exactly when their fields are.
#[derive(Clone, PartialEq, Eq)]
pub struct Decimal {
    digits: BigInt,
    scale: u32,
}

/// An exact numeric literal.
///
/// Integers of any size and decimals of any precision are kept exactly. A
/// number renders as the shortest decimal text that parses back to it, so
/// text and wire forms round-trip without loss.
#[derive(Clone)]
pub enum Number {
    UInt(u64),
    Int(i64),
    BigInt(Rc<BigInt>),
    Decimal(Rc<Decimal>),
}

impl Number {
    fn from_bigint_owned(value: BigInt) -> Self {
        if value.is_zero() {
            return Number::Int(0);
        }

        if value.is_negative() {
            if let Some(i) = value.to_i64() {
                return Number::Int(i);
            }
        } else if let Some(u) = value.to_u64() {
            return Number::UInt(u);
        }

        Number::BigInt(Rc::new(value))
    }

    fn to_bigint_owned(&self) -> Option<BigInt> {
        match self {
            Number::UInt(v) => Some(BigInt::from(*v)),
            Number::Int(v) => Some(BigInt::from(*v)),
            Number::BigInt(v) => Some((**v).clone()),
            Number::Decimal(_) => None,
        }
    }

    /// Exact decimal text of the number. Parsing this text yields an equal number.
    pub fn format_decimal(&self) -> String {
        match self {
            Number::UInt(v) => v.to_string(),
            Number::Int(v) => v.to_string(),
            Number::BigInt(v) => v.to_string(),
            Number::Decimal(d) => {
                let sign = if d.digits.is_negative() { "-" } else { "" };
                let digits = d.digits.abs().to_string();
                let scale = d.scale as usize;
                if digits.len() > scale {
                    let (int, frac) = digits.split_at(digits.len() - scale);
                    format!("{sign}{int}.{frac}")
                } else {
                    format!("{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
                }
            }
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = self.format_decimal();
        let v = serde_json::Number::from_str(&s)
            .map_err(|_| serde::ser::Error::custom("could not serialize number"))?;
        v.serialize(serializer)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::from_bigint_owned(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::UInt(value)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::UInt(u64::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        match u64::try_from(value) {
            Ok(u) => Number::UInt(u),
            Err(_) => Number::Int(value),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from(i64::from(value))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl Display for ParseNumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("invalid number")
    }
}

impl std::error::Error for ParseNumberError {}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(idx) => (
                &unsigned[..idx],
                unsigned[idx + 1..]
                    .parse::<i64>()
                    .map_err(|_| ParseNumberError)?,
            ),
            None => (unsigned, 0),
        };

        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() && frac.is_empty() {
            return Err(ParseNumberError);
        }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(ParseNumberError);
        }

        let digits = format!("{int}{frac}");
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Number::Int(0));
        }

        // Value is `digits * 10^exponent`; fold trailing zeros into the exponent.
        let trimmed = digits.trim_end_matches('0');
        let mut exponent = exponent - frac.len() as i64;
        exponent += (digits.len() - trimmed.len()) as i64;
        if exponent.unsigned_abs() > u64::from(MAX_EXPONENT) {
            return Err(ParseNumberError);
        }

        let mut value = BigInt::parse_bytes(trimmed.as_bytes(), 10).ok_or(ParseNumberError)?;
        if negative {
            value = -value;
        }

        match u32::try_from(exponent) {
            Ok(exp) => Ok(Number::from_bigint_owned(value * pow10_bigint(exp))),
            Err(_) => Ok(Number::Decimal(Rc::new(Decimal {
                digits: value,
                scale: u32::try_from(-exponent).map_err(|_| ParseNumberError)?,
            }))),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            (Number::Decimal(_), _) | (_, Number::Decimal(_)) => false,
            _ => self.to_bigint_owned() == other.to_bigint_owned(),
        }
    }
}

impl Eq for Number {}

fn pow10_bigint(exp: u32) -> BigInt {
    let mut result = BigInt::from(1u8);
    let mut base = BigInt::from(10u8);
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result *= &base;
        }
        if e > 1 {
            base = &base * &base;
        }
        e >>= 1;
    }

    result
}
