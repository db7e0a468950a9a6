//! Tx: the transaction envelope.
//!
//! A transaction wraps exactly one message with optional fee information, an
//! optional hash-lock preimage, and the signatures authorising it. Only the
//! signature list may change after construction.
//!
//! The bytes that get signed are the canonical encoding of the envelope with
//! an empty signature list, so adding or removing signatures never changes
//! what earlier signers signed.

use bytes::Bytes;
use ciborium::value::Value;

use crate::canonical::{bytes_value, decode_value, encode_canonical, entry, opt_bytes_value, Fields};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::{CoreError, ValidationError};
use crate::msg::Msg;
use crate::types::{Address, Coin};

/// Domain prefix of the per-signer signing payload.
pub const SIGN_DOMAIN: &[u8] = b"ledger-tx/sig/v1";

/// Envelope field keys.
mod keys {
    pub const FEES: u64 = 1;
    pub const SIGNATURES: u64 = 2;
    pub const PREIMAGE: u64 = 3;
    pub const SUM: u64 = 4;
}

/// Fee offered for processing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeInfo {
    /// Who pays. `None` means the first signer.
    pub payer: Option<Address>,
    pub fees: Coin,
}

impl FeeInfo {
    /// Check the payer format and that the fee is a valid, non-negative amount.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(payer) = &self.payer {
            payer.validate("payer")?;
        }
        self.fees.validate("fees")?;
        if self.fees.whole < 0 || self.fees.fractional < 0 {
            return Err(ValidationError::InvalidCoin {
                field: "fees",
                reason: "fee must not be negative",
            });
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, opt_bytes_value(self.payer.as_ref().map(|a| &a.0))),
            entry(1, self.fees.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "fees")?;
        Ok(Self {
            payer: fields.opt_bytes(0)?.map(Address),
            fees: Coin::from_value(fields.required(1)?)?,
        })
    }
}

/// One signature over a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdSignature {
    pub pubkey: Ed25519PublicKey,
    pub signature: Ed25519Signature,
    /// The signer's account sequence, for replay protection.
    pub sequence: u64,
}

impl StdSignature {
    /// The address that produced this signature.
    pub fn signer(&self) -> Address {
        self.pubkey.address()
    }

    fn to_value(&self) -> Value {
        Value::Map(vec![
            entry(0, bytes_value(self.pubkey.as_bytes())),
            entry(1, bytes_value(self.signature.as_bytes())),
            entry(2, Value::Integer(self.sequence.into())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "signature")?;
        Ok(Self {
            pubkey: Ed25519PublicKey(fields.fixed::<32>(0)?),
            signature: Ed25519Signature(fields.fixed::<64>(1)?),
            sequence: fields.uint(2)?,
        })
    }
}

/// The message slot of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Sum {
    /// A message this build understands.
    Known(Msg),
    /// A message tag from a newer protocol version. Kept verbatim so the
    /// transaction still re-encodes to its original bytes.
    Unknown { tag: u64, body: Value },
}

impl Sum {
    pub fn tag(&self) -> u64 {
        match self {
            Sum::Known(msg) => msg.tag(),
            Sum::Unknown { tag, .. } => *tag,
        }
    }

    fn to_value(&self) -> Value {
        let body = match self {
            Sum::Known(msg) => msg.body_value(),
            Sum::Unknown { body, .. } => body.clone(),
        };
        Value::Array(vec![Value::Integer(self.tag().into()), body])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let (tag, body) = match value {
            Value::Array(items) if items.len() == 2 => {
                let tag = match &items[0] {
                    Value::Integer(i) => u64::try_from(*i)
                        .map_err(|_| CoreError::decoding("sum: tag out of range"))?,
                    _ => return Err(CoreError::decoding("sum: tag must be an integer")),
                };
                (tag, &items[1])
            }
            _ => return Err(CoreError::decoding("sum: expected [tag, body]")),
        };

        match Msg::from_tagged(tag, body)? {
            Some(msg) => Ok(Sum::Known(msg)),
            None => Ok(Sum::Unknown {
                tag,
                body: body.clone(),
            }),
        }
    }
}

/// A transaction envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Tx {
    sum: Sum,
    fees: Option<FeeInfo>,
    preimage: Option<Bytes>,
    signatures: Vec<StdSignature>,
}

impl Tx {
    /// Create an unsigned transaction carrying `msg`.
    pub fn new(msg: impl Into<Msg>) -> Self {
        TxBuilder::new(msg).build()
    }

    /// Decode a transaction from its canonical bytes.
    ///
    /// Rejects malformed, truncated or non-canonical input, trailing bytes,
    /// and envelopes with no message.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let value = decode_value(bytes)?;
        let tx = Self::from_value(&value)?;

        // Only the canonical form is accepted, so one transaction has exactly
        // one byte representation.
        match tx.encode() {
            Ok(reencoded) if reencoded == bytes => Ok(tx),
            _ => Err(CoreError::decoding("non-canonical encoding")),
        }
    }

    /// Encode the full transaction, signatures included.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_canonical(&self.to_value(&self.signatures))
    }

    /// The bytes a signer signs: the encoding with an empty signature list.
    ///
    /// Depends only on the message, fees and preimage. Does not touch `self`.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, CoreError> {
        encode_canonical(&self.to_value(&[]))
    }

    /// The message handed to the signature module for one signer.
    ///
    /// `SIGN_DOMAIN || len(chain_id) || chain_id || sequence (BE) || sign_bytes`.
    pub fn signing_payload(&self, chain_id: &str, sequence: u64) -> Result<Vec<u8>, CoreError> {
        let chain_len = u8::try_from(chain_id.len())
            .map_err(|_| CoreError::EncodingError("chain id longer than 255 bytes".into()))?;
        let sign_bytes = self.sign_bytes()?;

        let mut buf = Vec::with_capacity(SIGN_DOMAIN.len() + 1 + chain_id.len() + 8 + sign_bytes.len());
        buf.extend_from_slice(SIGN_DOMAIN);
        buf.push(chain_len);
        buf.extend_from_slice(chain_id.as_bytes());
        buf.extend_from_slice(&sequence.to_be_bytes());
        buf.extend_from_slice(&sign_bytes);
        Ok(buf)
    }

    /// The message carried by this transaction.
    ///
    /// Fails with `UnknownMessageKind` if the message tag is not one this
    /// build knows.
    pub fn get_msg(&self) -> Result<&Msg, CoreError> {
        match &self.sum {
            Sum::Known(msg) => Ok(msg),
            Sum::Unknown { tag, .. } => Err(CoreError::UnknownMessageKind(*tag)),
        }
    }

    /// The raw message slot, including unrecognised tags.
    pub fn sum(&self) -> &Sum {
        &self.sum
    }

    pub fn fees(&self) -> Option<&FeeInfo> {
        self.fees.as_ref()
    }

    /// Hash-lock preimage revealed by this transaction, if any.
    pub fn preimage(&self) -> Option<&Bytes> {
        self.preimage.as_ref()
    }

    pub fn signatures(&self) -> &[StdSignature] {
        &self.signatures
    }

    /// Addresses of all signers, in signature order.
    pub fn signers(&self) -> Vec<Address> {
        self.signatures.iter().map(StdSignature::signer).collect()
    }

    /// Append a signature.
    pub fn add_signature(&mut self, signature: StdSignature) {
        self.signatures.push(signature);
    }

    /// Remove and return all signatures.
    pub fn clear_signatures(&mut self) -> Vec<StdSignature> {
        std::mem::take(&mut self.signatures)
    }

    /// Build the envelope value with the given signature list.
    fn to_value(&self, signatures: &[StdSignature]) -> Value {
        let fees = match &self.fees {
            Some(f) => f.to_value(),
            None => Value::Null,
        };
        let signatures = signatures.iter().map(StdSignature::to_value).collect();

        Value::Map(vec![
            entry(keys::FEES, fees),
            entry(keys::SIGNATURES, Value::Array(signatures)),
            entry(keys::PREIMAGE, opt_bytes_value(self.preimage.as_ref())),
            entry(keys::SUM, self.sum.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CoreError> {
        let fields = Fields::new(value, "tx")?;

        let sum = match fields.get(keys::SUM) {
            Some(v) => Sum::from_value(v)?,
            None => return Err(CoreError::decoding("transaction carries no message")),
        };

        let fees = match fields.get(keys::FEES) {
            Some(v) => Some(FeeInfo::from_value(v)?),
            None => None,
        };

        let signatures = fields
            .array(keys::SIGNATURES)?
            .iter()
            .map(StdSignature::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sum,
            fees,
            preimage: fields.opt_bytes(keys::PREIMAGE)?,
            signatures,
        })
    }
}

/// Decode raw transaction bytes. The entry point for bytes arriving from the
/// network or the mempool.
pub fn decode_tx(bytes: &[u8]) -> Result<Tx, CoreError> {
    Tx::decode(bytes)
}

/// Builder for unsigned transactions.
pub struct TxBuilder {
    msg: Msg,
    fees: Option<FeeInfo>,
    preimage: Option<Bytes>,
}

impl TxBuilder {
    /// Start building a transaction around `msg`.
    pub fn new(msg: impl Into<Msg>) -> Self {
        Self {
            msg: msg.into(),
            fees: None,
            preimage: None,
        }
    }

    /// Set the fee.
    pub fn fees(mut self, fees: FeeInfo) -> Self {
        self.fees = Some(fees);
        self
    }

    /// Set the hash-lock preimage.
    pub fn preimage(mut self, preimage: impl Into<Bytes>) -> Self {
        self.preimage = Some(preimage.into());
        self
    }

    pub fn build(self) -> Tx {
        Tx {
            sum: Sum::Known(self.msg),
            fees: self.fees,
            preimage: self.preimage,
            signatures: Vec::new(),
        }
    }
}
