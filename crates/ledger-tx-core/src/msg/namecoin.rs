//! Account naming and token registration.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::canonical::{bytes_value, entry, Fields};
use crate::error::{CoreError, ValidationError};
use crate::msg::Message;
use crate::types::{is_ticker, Address};
use crate::validation::check_len;

/// Most significant figures a token may declare.
pub const MAX_SIG_FIGS: u32 = 9;

/// Attach a human-readable name to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNameMsg {
    pub address: Address,
    pub name: String,
}

impl Message for SetNameMsg {
    const TAG: u64 = 2;
    const PATH: &'static str = "namecoin/set_name";

    fn validate(&self) -> Result<(), ValidationError> {
        self.address.validate("address")?;
        check_len("name", self.name.len(), 4, 20)?;
        let ok = self
            .name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !ok {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "only a-z, 0-9 and _ allowed",
            });
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.address.0)),
            entry(1, Value::Text(self.name.clone())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "set_name")?;
        Ok(Self {
            address: Address(fields.bytes(0)?),
            name: fields.text(1)?,
        })
    }
}

/// Register a new currency ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTokenMsg {
    pub ticker: String,
    pub name: String,
    pub sig_figs: u32,
}

impl Message for NewTokenMsg {
    const TAG: u64 = 3;
    const PATH: &'static str = "namecoin/new_token";

    fn validate(&self) -> Result<(), ValidationError> {
        if !is_ticker(&self.ticker) {
            return Err(ValidationError::InvalidField {
                field: "ticker",
                reason: "must be 3-4 uppercase letters",
            });
        }
        check_len("name", self.name.len(), 3, 32)?;
        let ok = self
            .name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b" _:-".contains(&b));
        if !ok {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "only letters, digits, space, _ : - allowed",
            });
        }
        if self.sig_figs > MAX_SIG_FIGS {
            return Err(ValidationError::InvalidField {
                field: "sig_figs",
                reason: "must be at most 9",
            });
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, Value::Text(self.ticker.clone())),
            entry(1, Value::Text(self.name.clone())),
            entry(2, Value::Integer(self.sig_figs.into())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "new_token")?;
        let sig_figs = fields.uint(2)?;
        Ok(Self {
            ticker: fields.text(0)?,
            name: fields.text(1)?,
            sig_figs: u32::try_from(sig_figs)
                .map_err(|_| CoreError::decoding("new_token: sig_figs out of range"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_LEN;

    #[test]
    fn test_set_name() {
        let msg = SetNameMsg {
            address: Address::from([0x03; ADDRESS_LEN]),
            name: "alice_01".into(),
        };
        assert!(msg.validate().is_ok());

        let upper = SetNameMsg {
            name: "Alice".into(),
            ..msg.clone()
        };
        assert!(matches!(
            upper.validate(),
            Err(ValidationError::InvalidField { field: "name", .. })
        ));

        let short = SetNameMsg {
            name: "abc".into(),
            ..msg
        };
        assert!(matches!(
            short.validate(),
            Err(ValidationError::LengthOutOfRange { field: "name", .. })
        ));
    }

    #[test]
    fn test_new_token() {
        let msg = NewTokenMsg {
            ticker: "ETH".into(),
            name: "Ether: main-net".into(),
            sig_figs: 9,
        };
        assert!(msg.validate().is_ok());

        let bad_ticker = NewTokenMsg {
            ticker: "E1H".into(),
            ..msg.clone()
        };
        assert!(bad_ticker.validate().is_err());

        let bad_name = NewTokenMsg {
            name: "Ether!".into(),
            ..msg.clone()
        };
        assert!(bad_name.validate().is_err());

        let bad_figs = NewTokenMsg {
            sig_figs: 10,
            ..msg
        };
        assert!(matches!(
            bad_figs.validate(),
            Err(ValidationError::InvalidField { field: "sig_figs", .. })
        ));
    }

    #[test]
    fn test_value_roundtrip() {
        let msg = NewTokenMsg {
            ticker: "IOV".into(),
            name: "Internet of Values".into(),
            sig_figs: 6,
        };
        assert_eq!(NewTokenMsg::from_value(&msg.to_value()).unwrap(), msg);
    }
}
