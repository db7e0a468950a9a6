//! # Ledger Tx
//!
//! The transaction API: decode raw transactions, resolve their message,
//! validate it, and route it to the handler registered for its path.
//!
//! ## Overview
//!
//! - **Envelope**: [`Tx`] carries exactly one message, optional fees, an
//!   optional preimage, and any number of signatures
//! - **Messages**: [`Msg`] is the closed set of message kinds, each with a
//!   wire tag and a routing path such as `cash/send`
//! - **Sign bytes**: [`Tx::sign_bytes`] is the canonical encoding without
//!   signatures, identical before and after signing
//! - **Dispatch**: [`Dispatcher`] runs size limit, decode, validation and
//!   routing, returning a typed [`DispatchError`] on any failure
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ledger_tx::core::msg::SendMsg;
//! use ledger_tx::{DeliverResult, Dispatcher, DispatcherConfig, Handler, Msg, Router, Tx};
//!
//! struct Bank;
//!
//! #[async_trait::async_trait]
//! impl Handler for Bank {
//!     async fn deliver(&self, _tx: &Tx, msg: &Msg) -> anyhow::Result<DeliverResult> {
//!         Ok(DeliverResult { log: format!("executed {}", msg.path()), ..Default::default() })
//!     }
//! }
//!
//! async fn example(raw: &[u8]) -> ledger_tx::Result<()> {
//!     let mut router = Router::new();
//!     router.route::<SendMsg>(Arc::new(Bank))?;
//!
//!     let dispatcher = Dispatcher::new(router, DispatcherConfig::default());
//!     let result = dispatcher.deliver_tx(raw).await?;
//!     println!("{}", result.log);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ledger_tx::core` - Envelope, messages, canonical encoding, validation

pub mod dispatcher;
pub mod error;

// Re-export component crates
pub use ledger_tx_core as core;

// Re-export main types for convenience
pub use dispatcher::{DeliverResult, Dispatcher, DispatcherConfig, Handler, Router};
pub use error::{DispatchError, Result};

// Re-export commonly used core types
pub use ledger_tx_core::{
    decode_tx, Address, Coin, CoreError, FeeInfo, Message, Msg, StdSignature, Sum, Tx, TxBuilder,
    ValidationError,
};
