//! Token transfer.

use bytes::Bytes;
use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::canonical::{bytes_value, entry, Fields};
use crate::error::{CoreError, ValidationError};
use crate::msg::Message;
use crate::types::{Address, Coin};
use crate::validation::check_max_len;

/// Longest memo accepted on a transfer, in bytes.
pub const MAX_MEMO_LEN: usize = 128;

/// Longest external reference accepted on a transfer, in bytes.
pub const MAX_REF_LEN: usize = 64;

/// Move an amount from one address to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMsg {
    pub src: Address,
    pub dest: Address,
    pub amount: Coin,
    /// Free-form note shown to the recipient.
    pub memo: String,
    /// Opaque reference, e.g. an invoice id.
    pub reference: Bytes,
}

impl Message for SendMsg {
    const TAG: u64 = 1;
    const PATH: &'static str = "cash/send";

    fn validate(&self) -> Result<(), ValidationError> {
        self.src.validate("src")?;
        self.dest.validate("dest")?;
        self.amount.validate_positive("amount")?;
        check_max_len("memo", self.memo.len(), MAX_MEMO_LEN)?;
        check_max_len("reference", self.reference.len(), MAX_REF_LEN)?;
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.src.0)),
            entry(1, bytes_value(&self.dest.0)),
            entry(2, self.amount.to_value()),
            entry(3, Value::Text(self.memo.clone())),
            entry(4, bytes_value(&self.reference)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "send")?;
        Ok(Self {
            src: Address(fields.bytes(0)?),
            dest: Address(fields.bytes(1)?),
            amount: Coin::from_value(fields.required(2)?)?,
            memo: fields.text(3)?,
            reference: fields.bytes(4)?,
        })
    }
}
