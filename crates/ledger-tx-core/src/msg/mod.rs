//! Message payloads: the closed set of business messages a transaction can carry.
//!
//! Each message kind has a stable wire tag and a routing path. The mapping
//! from tag to payload type is a total `match` in [`Msg::from_tagged`]; a tag
//! outside the set is not an error at this level, it is handed back as `None`
//! so the envelope can preserve it and report it when asked for the message.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};

pub mod cash;
pub mod escrow;
pub mod namecoin;
pub mod username;

pub use cash::SendMsg;
pub use escrow::{CreateEscrowMsg, ReleaseEscrowMsg, ReturnEscrowMsg, UpdateEscrowPartiesMsg};
pub use namecoin::{NewTokenMsg, SetNameMsg};
pub use username::{AddChainAddressMsg, ChainAddress, IssueTokenMsg, RemoveChainAddressMsg, TokenDetails};

/// Behaviour shared by every concrete message type.
pub trait Message: Sized {
    /// Wire tag. Never reused once assigned.
    const TAG: u64;

    /// Routing key used to find the handler for this message.
    const PATH: &'static str;

    /// Check the message fields. Pure, no state access.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Convert to a CBOR value (before canonical encoding).
    fn to_value(&self) -> Value;

    /// Parse from a CBOR value.
    fn from_value(value: &Value) -> Result<Self, CoreError>;
}

/// One message out of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    Send(SendMsg),
    SetName(SetNameMsg),
    NewToken(NewTokenMsg),
    CreateEscrow(CreateEscrowMsg),
    ReleaseEscrow(ReleaseEscrowMsg),
    ReturnEscrow(ReturnEscrowMsg),
    UpdateEscrowParties(UpdateEscrowPartiesMsg),
    IssueToken(IssueTokenMsg),
    AddChainAddress(AddChainAddressMsg),
    RemoveChainAddress(RemoveChainAddressMsg),
}

/// Every tag this build understands, in tag order.
pub const KNOWN_TAGS: [u64; 10] = [
    SendMsg::TAG,
    SetNameMsg::TAG,
    NewTokenMsg::TAG,
    CreateEscrowMsg::TAG,
    ReleaseEscrowMsg::TAG,
    ReturnEscrowMsg::TAG,
    UpdateEscrowPartiesMsg::TAG,
    IssueTokenMsg::TAG,
    AddChainAddressMsg::TAG,
    RemoveChainAddressMsg::TAG,
];

impl Msg {
    /// The wire tag of the active variant.
    pub fn tag(&self) -> u64 {
        match self {
            Msg::Send(_) => SendMsg::TAG,
            Msg::SetName(_) => SetNameMsg::TAG,
            Msg::NewToken(_) => NewTokenMsg::TAG,
            Msg::CreateEscrow(_) => CreateEscrowMsg::TAG,
            Msg::ReleaseEscrow(_) => ReleaseEscrowMsg::TAG,
            Msg::ReturnEscrow(_) => ReturnEscrowMsg::TAG,
            Msg::UpdateEscrowParties(_) => UpdateEscrowPartiesMsg::TAG,
            Msg::IssueToken(_) => IssueTokenMsg::TAG,
            Msg::AddChainAddress(_) => AddChainAddressMsg::TAG,
            Msg::RemoveChainAddress(_) => RemoveChainAddressMsg::TAG,
        }
    }

    /// The routing path of the active variant.
    pub fn path(&self) -> &'static str {
        match self {
            Msg::Send(_) => SendMsg::PATH,
            Msg::SetName(_) => SetNameMsg::PATH,
            Msg::NewToken(_) => NewTokenMsg::PATH,
            Msg::CreateEscrow(_) => CreateEscrowMsg::PATH,
            Msg::ReleaseEscrow(_) => ReleaseEscrowMsg::PATH,
            Msg::ReturnEscrow(_) => ReturnEscrowMsg::PATH,
            Msg::UpdateEscrowParties(_) => UpdateEscrowPartiesMsg::PATH,
            Msg::IssueToken(_) => IssueTokenMsg::PATH,
            Msg::AddChainAddress(_) => AddChainAddressMsg::PATH,
            Msg::RemoveChainAddress(_) => RemoveChainAddressMsg::PATH,
        }
    }

    /// Validate the active variant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Msg::Send(m) => m.validate(),
            Msg::SetName(m) => m.validate(),
            Msg::NewToken(m) => m.validate(),
            Msg::CreateEscrow(m) => m.validate(),
            Msg::ReleaseEscrow(m) => m.validate(),
            Msg::ReturnEscrow(m) => m.validate(),
            Msg::UpdateEscrowParties(m) => m.validate(),
            Msg::IssueToken(m) => m.validate(),
            Msg::AddChainAddress(m) => m.validate(),
            Msg::RemoveChainAddress(m) => m.validate(),
        }
    }

    /// The message body as a CBOR value (without the tag).
    pub fn body_value(&self) -> Value {
        match self {
            Msg::Send(m) => m.to_value(),
            Msg::SetName(m) => m.to_value(),
            Msg::NewToken(m) => m.to_value(),
            Msg::CreateEscrow(m) => m.to_value(),
            Msg::ReleaseEscrow(m) => m.to_value(),
            Msg::ReturnEscrow(m) => m.to_value(),
            Msg::UpdateEscrowParties(m) => m.to_value(),
            Msg::IssueToken(m) => m.to_value(),
            Msg::AddChainAddress(m) => m.to_value(),
            Msg::RemoveChainAddress(m) => m.to_value(),
        }
    }

    /// Parse a message body given its tag.
    ///
    /// Returns `Ok(None)` for a tag outside the known set. A known tag with a
    /// malformed body is a decoding error.
    pub fn from_tagged(tag: u64, body: &Value) -> Result<Option<Self>, CoreError> {
        let msg = match tag {
            SendMsg::TAG => Msg::Send(SendMsg::from_value(body)?),
            SetNameMsg::TAG => Msg::SetName(SetNameMsg::from_value(body)?),
            NewTokenMsg::TAG => Msg::NewToken(NewTokenMsg::from_value(body)?),
            CreateEscrowMsg::TAG => Msg::CreateEscrow(CreateEscrowMsg::from_value(body)?),
            ReleaseEscrowMsg::TAG => Msg::ReleaseEscrow(ReleaseEscrowMsg::from_value(body)?),
            ReturnEscrowMsg::TAG => Msg::ReturnEscrow(ReturnEscrowMsg::from_value(body)?),
            UpdateEscrowPartiesMsg::TAG => {
                Msg::UpdateEscrowParties(UpdateEscrowPartiesMsg::from_value(body)?)
            }
            IssueTokenMsg::TAG => Msg::IssueToken(IssueTokenMsg::from_value(body)?),
            AddChainAddressMsg::TAG => Msg::AddChainAddress(AddChainAddressMsg::from_value(body)?),
            RemoveChainAddressMsg::TAG => {
                Msg::RemoveChainAddress(RemoveChainAddressMsg::from_value(body)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }
}

impl From<SendMsg> for Msg {
    fn from(m: SendMsg) -> Self {
        Msg::Send(m)
    }
}

impl From<SetNameMsg> for Msg {
    fn from(m: SetNameMsg) -> Self {
        Msg::SetName(m)
    }
}

impl From<NewTokenMsg> for Msg {
    fn from(m: NewTokenMsg) -> Self {
        Msg::NewToken(m)
    }
}

impl From<CreateEscrowMsg> for Msg {
    fn from(m: CreateEscrowMsg) -> Self {
        Msg::CreateEscrow(m)
    }
}

impl From<ReleaseEscrowMsg> for Msg {
    fn from(m: ReleaseEscrowMsg) -> Self {
        Msg::ReleaseEscrow(m)
    }
}

impl From<ReturnEscrowMsg> for Msg {
    fn from(m: ReturnEscrowMsg) -> Self {
        Msg::ReturnEscrow(m)
    }
}

impl From<UpdateEscrowPartiesMsg> for Msg {
    fn from(m: UpdateEscrowPartiesMsg) -> Self {
        Msg::UpdateEscrowParties(m)
    }
}

impl From<IssueTokenMsg> for Msg {
    fn from(m: IssueTokenMsg) -> Self {
        Msg::IssueToken(m)
    }
}

impl From<AddChainAddressMsg> for Msg {
    fn from(m: AddChainAddressMsg) -> Self {
        Msg::AddChainAddress(m)
    }
}

impl From<RemoveChainAddressMsg> for Msg {
    fn from(m: RemoveChainAddressMsg) -> Self {
        Msg::RemoveChainAddress(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Coin, ADDRESS_LEN};

    fn one_of_each() -> Vec<Msg> {
        let addr = Address::from([0x11; ADDRESS_LEN]);
        vec![
            SendMsg {
                src: addr.clone(),
                dest: Address::from([0x22; ADDRESS_LEN]),
                amount: Coin::new(1, 0, "IOV"),
                memo: String::new(),
                reference: Default::default(),
            }
            .into(),
            SetNameMsg {
                address: addr.clone(),
                name: "alice".into(),
            }
            .into(),
            NewTokenMsg {
                ticker: "IOV".into(),
                name: "Internet of Values".into(),
                sig_figs: 9,
            }
            .into(),
            CreateEscrowMsg {
                src: addr.clone(),
                arbiter: addr.0.clone(),
                recipient: addr.0.clone(),
                amount: vec![Coin::new(1, 0, "IOV")],
                timeout: 100,
                memo: String::new(),
            }
            .into(),
            ReleaseEscrowMsg {
                escrow_id: vec![0; 8].into(),
                amount: vec![],
            }
            .into(),
            ReturnEscrowMsg {
                escrow_id: vec![0; 8].into(),
            }
            .into(),
            UpdateEscrowPartiesMsg {
                escrow_id: vec![0; 8].into(),
                sender: None,
                arbiter: Some(addr.0.clone()),
                recipient: None,
            }
            .into(),
            IssueTokenMsg {
                owner: addr,
                id: b"alice@example.com".to_vec().into(),
                details: TokenDetails::default(),
            }
            .into(),
            AddChainAddressMsg {
                id: b"alice@example.com".to_vec().into(),
                chain_id: b"myChain".to_vec().into(),
                address: b"myChainAddress".to_vec().into(),
            }
            .into(),
            RemoveChainAddressMsg {
                id: b"alice@example.com".to_vec().into(),
                chain_id: b"myChain".to_vec().into(),
                address: b"myChainAddress".to_vec().into(),
            }
            .into(),
        ]
    }

    #[test]
    fn test_every_known_tag_resolves() {
        let msgs = one_of_each();
        let tags: Vec<u64> = msgs.iter().map(Msg::tag).collect();
        assert_eq!(tags, KNOWN_TAGS.to_vec());

        for msg in msgs {
            let parsed = Msg::from_tagged(msg.tag(), &msg.body_value()).unwrap();
            assert_eq!(parsed, Some(msg));
        }
    }

    #[test]
    fn test_unknown_tag_is_none() {
        let body = Value::Map(vec![]);
        assert_eq!(Msg::from_tagged(0, &body).unwrap(), None);
        assert_eq!(Msg::from_tagged(11, &body).unwrap(), None);
        assert_eq!(Msg::from_tagged(u64::MAX, &body).unwrap(), None);
    }

    #[test]
    fn test_known_tag_bad_body() {
        let result = Msg::from_tagged(SendMsg::TAG, &Value::Text("nope".into()));
        assert!(matches!(result, Err(CoreError::DecodingError(_))));
    }

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<&str> = one_of_each().iter().map(Msg::path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), KNOWN_TAGS.len());
    }

    #[test]
    fn test_sample_messages_validate() {
        for msg in one_of_each() {
            assert!(msg.validate().is_ok(), "{} should validate", msg.path());
        }
    }

    #[test]
    fn test_json_roundtrip() {
        for msg in one_of_each() {
            let json = serde_json::to_string(&msg).unwrap();
            let recovered: Msg = serde_json::from_str(&json).unwrap();
            assert_eq!(msg, recovered);
        }
    }
}
