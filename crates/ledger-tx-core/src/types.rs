//! Value types shared by the message variants.

use bytes::Bytes;
use ciborium::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{entry, Fields};
use crate::error::{CoreError, ValidationError};

/// Length of a well-formed address.
pub const ADDRESS_LEN: usize = 20;

/// Number of fractional units in one whole coin.
pub const FRAC_UNIT: i64 = 1_000_000_000;

/// An on-chain address.
///
/// Held as raw bytes so that a message carrying a malformed owner can still
/// be decoded and then rejected by validation with a precise error.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub Bytes);

impl Address {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to uppercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }

    /// Check presence and format. `field` names the message field in errors.
    pub fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
        if self.len() != ADDRESS_LEN {
            return Err(ValidationError::MalformedAddress {
                field,
                expected: ADDRESS_LEN,
                got: self.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Address {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<Vec<u8>> for Address {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(Bytes::copy_from_slice(&bytes))
    }
}

/// An amount of a single currency, split into whole and fractional units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coin {
    pub whole: i64,
    pub fractional: i64,
    pub ticker: String,
}

impl Coin {
    pub fn new(whole: i64, fractional: i64, ticker: impl Into<String>) -> Self {
        Self {
            whole,
            fractional,
            ticker: ticker.into(),
        }
    }

    /// Check the ticker and that the two parts form a normalized amount.
    pub fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        if !is_ticker(&self.ticker) {
            return Err(ValidationError::InvalidCoin {
                field,
                reason: "ticker must be 3-4 uppercase letters",
            });
        }
        if self.fractional <= -FRAC_UNIT || self.fractional >= FRAC_UNIT {
            return Err(ValidationError::InvalidCoin {
                field,
                reason: "fractional part out of range",
            });
        }
        if (self.whole < 0 && self.fractional > 0) || (self.whole > 0 && self.fractional < 0) {
            return Err(ValidationError::InvalidCoin {
                field,
                reason: "mismatched signs",
            });
        }
        Ok(())
    }

    /// True if the coin is valid and strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.validate("coin").is_ok() && (self.whole > 0 || self.fractional > 0)
    }

    /// Validate and require a strictly positive amount.
    pub fn validate_positive(&self, field: &'static str) -> Result<(), ValidationError> {
        self.validate(field)?;
        if self.whole <= 0 && self.fractional <= 0 {
            return Err(ValidationError::InvalidCoin {
                field,
                reason: "amount must be positive",
            });
        }
        Ok(())
    }
}

impl Coin {
    pub(crate) fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, Value::Integer(self.whole.into())),
            entry(1, Value::Integer(self.fractional.into())),
            entry(2, Value::Text(self.ticker.clone())),
        ])
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "coin")?;
        Ok(Self {
            whole: fields.int(0)?,
            fractional: fields.int(1)?,
            ticker: fields.text(2)?,
        })
    }

    /// Encode a list of coins as a CBOR array.
    pub(crate) fn list_to_value(coins: &[Coin]) -> Value {
        Value::Array(coins.iter().map(Coin::to_value).collect())
    }

    pub(crate) fn list_from_values(values: &[Value]) -> Result<Vec<Coin>, CoreError> {
        values.iter().map(Coin::from_value).collect()
    }
}

/// Currency tickers are 3 or 4 uppercase ASCII letters.
pub fn is_ticker(s: &str) -> bool {
    (3..=4).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}
