//! Escrow lifecycle messages.
//!
//! An escrow holds funds from `src` until the arbiter releases them to the
//! recipient or the timeout passes and they return to the sender.

use bytes::Bytes;
use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::canonical::{bytes_value, entry, opt_bytes_value, Fields};
use crate::error::{CoreError, ValidationError};
use crate::msg::cash::MAX_MEMO_LEN;
use crate::msg::Message;
use crate::types::{Address, Coin};
use crate::validation::{check_len, check_max_len, require};

/// Escrow ids are 8-byte sequence numbers assigned on creation.
pub const ESCROW_ID_LEN: usize = 8;

fn validate_escrow_id(id: &[u8]) -> Result<(), ValidationError> {
    require("escrow_id", id)?;
    check_len("escrow_id", id.len(), ESCROW_ID_LEN, ESCROW_ID_LEN)
}

/// Lock funds in a new escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEscrowMsg {
    pub src: Address,
    /// Condition or address allowed to release the funds.
    pub arbiter: Bytes,
    pub recipient: Bytes,
    pub amount: Vec<Coin>,
    /// Block height after which the funds may be returned.
    pub timeout: u64,
    pub memo: String,
}

impl Message for CreateEscrowMsg {
    const TAG: u64 = 4;
    const PATH: &'static str = "escrow/create";

    fn validate(&self) -> Result<(), ValidationError> {
        self.src.validate("src")?;
        require("arbiter", &self.arbiter)?;
        require("recipient", &self.recipient)?;
        if self.amount.is_empty() {
            return Err(ValidationError::MissingField("amount"));
        }
        for coin in &self.amount {
            coin.validate_positive("amount")?;
        }
        if self.timeout == 0 {
            return Err(ValidationError::InvalidField {
                field: "timeout",
                reason: "must be positive",
            });
        }
        check_max_len("memo", self.memo.len(), MAX_MEMO_LEN)
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.src.0)),
            entry(1, bytes_value(&self.arbiter)),
            entry(2, bytes_value(&self.recipient)),
            entry(3, Coin::list_to_value(&self.amount)),
            entry(4, Value::Integer(self.timeout.into())),
            entry(5, Value::Text(self.memo.clone())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "create_escrow")?;
        Ok(Self {
            src: Address(fields.bytes(0)?),
            arbiter: fields.bytes(1)?,
            recipient: fields.bytes(2)?,
            amount: Coin::list_from_values(fields.array(3)?)?,
            timeout: fields.uint(4)?,
            memo: fields.text(5)?,
        })
    }
}

/// Release some or all escrowed funds to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEscrowMsg {
    pub escrow_id: Bytes,
    /// Amounts to release. Empty releases everything.
    pub amount: Vec<Coin>,
}

impl Message for ReleaseEscrowMsg {
    const TAG: u64 = 5;
    const PATH: &'static str = "escrow/release";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_escrow_id(&self.escrow_id)?;
        for coin in &self.amount {
            coin.validate_positive("amount")?;
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.escrow_id)),
            entry(1, Coin::list_to_value(&self.amount)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "release_escrow")?;
        Ok(Self {
            escrow_id: fields.bytes(0)?,
            amount: Coin::list_from_values(fields.array(1)?)?,
        })
    }
}

/// Return escrowed funds to the sender after timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnEscrowMsg {
    pub escrow_id: Bytes,
}

impl Message for ReturnEscrowMsg {
    const TAG: u64 = 6;
    const PATH: &'static str = "escrow/return";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_escrow_id(&self.escrow_id)
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![entry(0, bytes_value(&self.escrow_id))])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "return_escrow")?;
        Ok(Self {
            escrow_id: fields.bytes(0)?,
        })
    }
}

/// Replace one or more parties of an escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEscrowPartiesMsg {
    pub escrow_id: Bytes,
    pub sender: Option<Address>,
    pub arbiter: Option<Bytes>,
    pub recipient: Option<Bytes>,
}

impl Message for UpdateEscrowPartiesMsg {
    const TAG: u64 = 7;
    const PATH: &'static str = "escrow/update";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_escrow_id(&self.escrow_id)?;
        if self.sender.is_none() && self.arbiter.is_none() && self.recipient.is_none() {
            return Err(ValidationError::InvalidField {
                field: "parties",
                reason: "at least one party must be updated",
            });
        }
        if let Some(sender) = &self.sender {
            sender.validate("sender")?;
        }
        if let Some(arbiter) = &self.arbiter {
            require("arbiter", arbiter)?;
        }
        if let Some(recipient) = &self.recipient {
            require("recipient", recipient)?;
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.escrow_id)),
            entry(1, opt_bytes_value(self.sender.as_ref().map(|a| &a.0))),
            entry(2, opt_bytes_value(self.arbiter.as_ref())),
            entry(3, opt_bytes_value(self.recipient.as_ref())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "update_escrow")?;
        Ok(Self {
            escrow_id: fields.bytes(0)?,
            sender: fields.opt_bytes(1)?.map(Address),
            arbiter: fields.opt_bytes(2)?,
            recipient: fields.opt_bytes(3)?,
        })
    }
}
