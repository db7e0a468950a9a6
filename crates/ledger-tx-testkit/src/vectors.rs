//! Golden test vectors for deterministic verification.
//!
//! Each vector pins the exact canonical bytes of an unsigned transaction.
//! Any implementation that decodes these bytes and re-encodes them must
//! produce the same hex, and `sign_bytes` must equal it.

use bytes::Bytes;

use ledger_tx_core::msg::{AddChainAddressMsg, IssueTokenMsg, ReturnEscrowMsg, TokenDetails};
use ledger_tx_core::{decode_tx, Address, Coin, CoreError, FeeInfo, Tx, TxBuilder, ADDRESS_LEN};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Builds the transaction the bytes describe.
    pub build: fn() -> Tx,
    /// Expected canonical encoding (hex).
    pub expected_hex: &'static str,
}

const ESCROW_ID: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

fn return_escrow() -> Tx {
    Tx::new(ReturnEscrowMsg {
        escrow_id: Bytes::from_static(&ESCROW_ID),
    })
}

fn return_escrow_with_preimage() -> Tx {
    TxBuilder::new(ReturnEscrowMsg {
        escrow_id: Bytes::from_static(&ESCROW_ID),
    })
    .preimage(Bytes::from_static(b"secret"))
    .build()
}

fn add_chain_address() -> Tx {
    Tx::new(AddChainAddressMsg {
        id: Bytes::from_static(b"me@example.com"),
        chain_id: Bytes::from_static(b"myChain"),
        address: Bytes::from_static(b"myChainAddress"),
    })
}

fn issue_token_with_fees() -> Tx {
    TxBuilder::new(IssueTokenMsg {
        owner: Address::from([0xa1; ADDRESS_LEN]),
        id: Bytes::from_static(b"alice@example.com"),
        details: TokenDetails::default(),
    })
    .fees(FeeInfo {
        payer: None,
        fees: Coin::new(0, 10_000, "IOV"),
    })
    .build()
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "return escrow",
            build: return_escrow,
            expected_hex: "a401f6028003f6048206a100480000000000000001",
        },
        GoldenVector {
            name: "return escrow with preimage",
            build: return_escrow_with_preimage,
            expected_hex: "a401f602800346736563726574048206a100480000000000000001",
        },
        GoldenVector {
            name: "add chain address",
            build: add_chain_address,
            expected_hex: "a401f6028003f6048209a3004e6d65406578616d706c652e636f6d01476d79436861696e024e6d79436861696e41646472657373",
        },
        GoldenVector {
            name: "issue token with fees",
            build: issue_token_with_fees,
            expected_hex: "a401a200f601a30000011927100263494f56028003f6048208a30054a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a10151616c696365406578616d706c652e636f6d02a10080",
        },
    ]
}

/// Why a vector failed.
#[derive(Debug)]
pub enum VectorMismatch {
    Encode(CoreError),
    Decode(CoreError),
    Bytes { expected: String, actual: String },
    SignBytes { expected: String, actual: String },
    Roundtrip,
}

/// Check one vector: encoding, sign bytes, and decode.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), VectorMismatch> {
    let tx = (vector.build)();

    let encoded = tx.encode().map_err(VectorMismatch::Encode)?;
    let actual = hex::encode(&encoded);
    if actual != vector.expected_hex {
        return Err(VectorMismatch::Bytes {
            expected: vector.expected_hex.to_string(),
            actual,
        });
    }

    let sign_bytes = hex::encode(tx.sign_bytes().map_err(VectorMismatch::Encode)?);
    if sign_bytes != vector.expected_hex {
        return Err(VectorMismatch::SignBytes {
            expected: vector.expected_hex.to_string(),
            actual: sign_bytes,
        });
    }

    let decoded = decode_tx(&encoded).map_err(VectorMismatch::Decode)?;
    if decoded != tx {
        return Err(VectorMismatch::Roundtrip);
    }
    Ok(())
}

/// Verify all vectors, returning the names and reasons of those that fail.
pub fn verify_all_vectors() -> Vec<(&'static str, VectorMismatch)> {
    all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err().map(|e| (v.name, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_tx_core::Msg;

    #[test]
    fn test_all_vectors_pass() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "failing vectors: {:?}", failures);
    }

    #[test]
    fn test_vectors_decode_to_expected_messages() {
        let bytes = hex::decode(all_vectors()[2].expected_hex).unwrap();
        let tx = decode_tx(&bytes).unwrap();
        match tx.get_msg().unwrap() {
            Msg::AddChainAddress(m) => {
                assert_eq!(&m.id[..], b"me@example.com");
                assert_eq!(&m.chain_id[..], b"myChain");
                assert_eq!(&m.address[..], b"myChainAddress");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(tx.signatures().is_empty());
        assert!(tx.fees().is_none());
    }

    #[test]
    fn test_issue_token_vector_carries_fees() {
        let bytes = hex::decode(all_vectors()[3].expected_hex).unwrap();
        let tx = decode_tx(&bytes).unwrap();
        let fees = tx.fees().unwrap();
        assert!(fees.payer.is_none());
        assert_eq!(fees.fees, Coin::new(0, 10_000, "IOV"));
        assert!(tx.get_msg().unwrap().validate().is_ok());
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        for (i, a) in vectors.iter().enumerate() {
            for b in &vectors[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
