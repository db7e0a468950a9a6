//! # Ledger Tx Testkit
//!
//! Testing utilities for ledger transactions.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned canonical bytes for cross-implementation checks
//! - **Generators**: Proptest strategies for messages and transactions
//! - **Fixtures**: Ed25519 signers bound to a chain id
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ledger_tx_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledger_tx_testkit::generators::tx;
//!
//! proptest! {
//!     #[test]
//!     fn sign_bytes_is_deterministic(tx in tx()) {
//!         prop_assert_eq!(tx.sign_bytes().unwrap(), tx.sign_bytes().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ledger_tx_core::msg::ReturnEscrowMsg;
//! use ledger_tx_core::Tx;
//! use ledger_tx_testkit::fixtures::{verify_tx_signature, TestFixture};
//!
//! let fixture = TestFixture::with_seed([1; 32]);
//! let mut tx = Tx::new(ReturnEscrowMsg { escrow_id: vec![0; 8].into() });
//! fixture.sign(&mut tx, 0);
//! assert!(verify_tx_signature(&tx, &fixture.chain_id, &tx.signatures()[0]));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, verify, verify_tx_signature, Keypair, TestFixture};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, GoldenVector};
