//! Identity tokens: human-readable ids bound to an owner, with chain addresses.

use bytes::Bytes;
use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::canonical::{bytes_value, entry, Fields};
use crate::error::{CoreError, ValidationError};
use crate::msg::Message;
use crate::types::Address;
use crate::validation::{validate_chain_address_mutation, validate_issue_token};

/// An address on an external chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainAddress {
    pub chain_id: Bytes,
    pub address: Bytes,
}

/// Extra data attached to an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenDetails {
    pub addresses: Vec<ChainAddress>,
}

impl TokenDetails {
    fn to_value(&self) -> Value {
        let addresses = self
            .addresses
            .iter()
            .map(|a| {
                Value::Map(vec![
                    entry(0, bytes_value(&a.chain_id)),
                    entry(1, bytes_value(&a.address)),
                ])
            })
            .collect();
        Value::Map(vec![entry(0, Value::Array(addresses))])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "token_details")?;
        let addresses = fields
            .array(0)?
            .iter()
            .map(|v| {
                let f = Fields::new(v, "chain_address")?;
                Ok(ChainAddress {
                    chain_id: f.bytes(0)?,
                    address: f.bytes(1)?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(Self { addresses })
    }
}

/// Issue a new identity token to `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTokenMsg {
    pub owner: Address,
    /// The human-readable identifier, e.g. `alice@example.com`.
    pub id: Bytes,
    pub details: TokenDetails,
}

impl Message for IssueTokenMsg {
    const TAG: u64 = 8;
    const PATH: &'static str = "nft/username/issue";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_issue_token(self)
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(&self.owner.0)),
            entry(1, bytes_value(&self.id)),
            entry(2, self.details.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "issue_username")?;
        Ok(Self {
            owner: Address(fields.bytes(0)?),
            id: fields.bytes(1)?,
            details: TokenDetails::from_value(fields.required(2)?)?,
        })
    }
}

fn chain_address_to_value(id: &[u8], chain_id: &[u8], address: &[u8]) -> Value {
    Value::Map(vec![
        entry(0, bytes_value(id)),
        entry(1, bytes_value(chain_id)),
        entry(2, bytes_value(address)),
    ])
}

fn chain_address_from_value(
    value: &Value,
    ctx: &'static str,
) -> Result<(Bytes, Bytes, Bytes), CoreError> {
    let fields = Fields::new(value, ctx)?;
    Ok((fields.bytes(0)?, fields.bytes(1)?, fields.bytes(2)?))
}

/// Attach an external chain address to an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChainAddressMsg {
    pub id: Bytes,
    pub chain_id: Bytes,
    pub address: Bytes,
}

impl Message for AddChainAddressMsg {
    const TAG: u64 = 9;
    const PATH: &'static str = "nft/username/address/add";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_chain_address_mutation(&self.id, &self.chain_id, &self.address)
    }

    fn to_value(&self) -> Value {
        chain_address_to_value(&self.id, &self.chain_id, &self.address)
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let (id, chain_id, address) = chain_address_from_value(value, "add_chain_address")?;
        Ok(Self {
            id,
            chain_id,
            address,
        })
    }
}

/// Detach an external chain address from an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveChainAddressMsg {
    pub id: Bytes,
    pub chain_id: Bytes,
    pub address: Bytes,
}

impl Message for RemoveChainAddressMsg {
    const TAG: u64 = 10;
    const PATH: &'static str = "nft/username/address/remove";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_chain_address_mutation(&self.id, &self.chain_id, &self.address)
    }

    fn to_value(&self) -> Value {
        chain_address_to_value(&self.id, &self.chain_id, &self.address)
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let (id, chain_id, address) = chain_address_from_value(value, "remove_chain_address")?;
        Ok(Self {
            id,
            chain_id,
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_LEN;

    fn add(id: &'static [u8], chain_id: &'static [u8], address: &'static [u8]) -> AddChainAddressMsg {
        AddChainAddressMsg {
            id: Bytes::from_static(id),
            chain_id: Bytes::from_static(chain_id),
            address: Bytes::from_static(address),
        }
    }

    fn remove(
        id: &'static [u8],
        chain_id: &'static [u8],
        address: &'static [u8],
    ) -> RemoveChainAddressMsg {
        RemoveChainAddressMsg {
            id: Bytes::from_static(id),
            chain_id: Bytes::from_static(chain_id),
            address: Bytes::from_static(address),
        }
    }

    #[test]
    fn test_issue_token_validate() {
        let msg = IssueTokenMsg {
            owner: Address::from([0xa1; ADDRESS_LEN]),
            id: Bytes::from_static(b"alice@example.com"),
            details: TokenDetails::default(),
        };
        assert!(msg.validate().is_ok());

        let bad = IssueTokenMsg {
            id: Bytes::from_static(b"foo*bar"),
            ..msg
        };
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::ForbiddenCharacter { .. })
        ));
    }

    #[test]
    fn test_add_chain_address_validate() {
        assert!(add(b"me@example.com", b"myChain", b"myChainAddress").validate().is_ok());
        assert_eq!(
            add(b"me@example.com", b"myChain", b"").validate(),
            Err(ValidationError::MissingField("address"))
        );
        assert_eq!(
            add(b"", b"myChain", b"myChainAddress").validate(),
            Err(ValidationError::MissingField("id"))
        );
        assert_eq!(
            add(b"me@example.com", b"", b"myChainAddress").validate(),
            Err(ValidationError::MissingField("chain_id"))
        );
    }

    #[test]
    fn test_remove_chain_address_validate() {
        assert!(remove(b"me@example.com", b"myChain", b"myChainAddress").validate().is_ok());
        assert_eq!(
            remove(b"me@example.com", b"myChain", b"").validate(),
            Err(ValidationError::MissingField("address"))
        );
        assert_eq!(
            remove(b"", b"myChain", b"myChainAddress").validate(),
            Err(ValidationError::MissingField("id"))
        );
        assert_eq!(
            remove(b"me@example.com", b"", b"myChainAddress").validate(),
            Err(ValidationError::MissingField("chain_id"))
        );
    }

    #[test]
    fn test_details_roundtrip() {
        let msg = IssueTokenMsg {
            owner: Address::from([0xa1; ADDRESS_LEN]),
            id: Bytes::from_static(b"@iov_official"),
            details: TokenDetails {
                addresses: vec![ChainAddress {
                    chain_id: Bytes::from_static(b"ethereum"),
                    address: Bytes::from_static(b"0xdeadbeef"),
                }],
            },
        };
        assert_eq!(IssueTokenMsg::from_value(&msg.to_value()).unwrap(), msg);
    }

    #[test]
    fn test_add_and_remove_share_layout() {
        let a = add(b"me@example.com", b"myChain", b"myChainAddress");
        let r = remove(b"me@example.com", b"myChain", b"myChainAddress");
        assert_eq!(a.to_value(), r.to_value());
        assert_ne!(AddChainAddressMsg::TAG, RemoveChainAddressMsg::TAG);
    }
}
