//! # Ledger Tx Core
//!
//! Pure primitives for ledger transactions: the envelope, the closed set of
//! message kinds, canonical encoding, and field validation.
//!
//! This crate contains no I/O, no storage, no networking, and no signing.
//!
//! ## Key Types
//!
//! - [`Tx`] - Transaction envelope: one message, optional fees, signatures
//! - [`Msg`] - The closed set of message kinds
//! - [`Message`] - Trait implemented by each concrete message
//! - [`Address`], [`Coin`] - Value types carried by messages
//!
//! ## Canonicalization
//!
//! Transactions are encoded using deterministic CBOR. Decoding accepts only
//! the canonical form. See [`canonical`] module.
//!
//! ## Sign bytes
//!
//! [`Tx::sign_bytes`] is the encoding with an empty signature list, so it is
//! the same before and after any number of signatures are attached.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod msg;
pub mod tx;
pub mod types;
pub mod validation;

pub use canonical::{decode_value, encode_canonical};
pub use crypto::{Ed25519PublicKey, Ed25519Signature};
pub use error::{CoreError, ValidationError};
pub use msg::{Message, Msg, KNOWN_TAGS};
pub use tx::{decode_tx, FeeInfo, StdSignature, Sum, Tx, TxBuilder, SIGN_DOMAIN};
pub use types::{Address, Coin, ADDRESS_LEN};
pub use validation::{validate_chain_address_mutation, validate_issue_token};
