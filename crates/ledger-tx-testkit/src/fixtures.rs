//! Test fixtures and helpers.
//!
//! The core never signs, so the keys used to produce real signatures in
//! tests live here.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use ledger_tx_core::{Address, Ed25519PublicKey, Ed25519Signature, StdSignature, Tx};

/// Chain id used by fixtures unless one is given explicitly.
pub const TEST_CHAIN_ID: &str = "test-chain";

/// An Ed25519 keypair for signing test transactions.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Check a signature. Stands in for the external verification module.
pub fn verify(pubkey: &Ed25519PublicKey, message: &[u8], signature: &Ed25519Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(pubkey.as_bytes()) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(signature.as_bytes()))
        .is_ok()
}

/// Check one attached signature against the transaction's current content.
pub fn verify_tx_signature(tx: &Tx, chain_id: &str, sig: &StdSignature) -> bool {
    match tx.signing_payload(chain_id, sig.sequence) {
        Ok(payload) => verify(&sig.pubkey, &payload, &sig.signature),
        Err(_) => false,
    }
}

/// A signer bound to a chain id.
pub struct TestFixture {
    pub keypair: Keypair,
    pub chain_id: String,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            chain_id: TEST_CHAIN_ID.to_string(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            chain_id: TEST_CHAIN_ID.to_string(),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Produce a signature over `tx` without attaching it.
    pub fn signature_for(&self, tx: &Tx, sequence: u64) -> StdSignature {
        let payload = tx
            .signing_payload(&self.chain_id, sequence)
            .expect("fixture chain id fits in one length byte");
        StdSignature {
            pubkey: self.public_key(),
            signature: self.keypair.sign(&payload),
            sequence,
        }
    }

    /// Sign `tx` and attach the signature.
    pub fn sign(&self, tx: &mut Tx, sequence: u64) {
        let sig = self.signature_for(tx, sequence);
        tx.add_signature(sig);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-signer tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use ledger_tx_core::msg::AddChainAddressMsg;
    use ledger_tx_core::decode_tx;

    fn sample_tx() -> Tx {
        Tx::new(AddChainAddressMsg {
            id: Bytes::from_static(b"me@example.com"),
            chain_id: Bytes::from_static(b"myChain"),
            address: Bytes::from_static(b"myChainAddress"),
        })
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let kp1 = Keypair::from_seed(&[0x42; 32]);
        let kp2 = Keypair::from_seed(&[0x42; 32]);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_sign_verify() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"hello world");
        assert!(verify(&kp.public_key(), b"hello world", &sig));
        assert!(!verify(&kp.public_key(), b"hello worlD", &sig));
    }

    #[test]
    fn test_signatures_survive_more_signers() {
        let parties = multi_party_fixtures(3);
        let mut tx = sample_tx();
        for (seq, party) in parties.iter().enumerate() {
            party.sign(&mut tx, seq as u64);
        }

        // Every earlier signature still verifies after later ones are added,
        // and after a round trip through the wire format.
        let decoded = decode_tx(&tx.encode().unwrap()).unwrap();
        for sig in decoded.signatures() {
            assert!(verify_tx_signature(&decoded, TEST_CHAIN_ID, sig));
        }
        assert_eq!(
            decoded.signers(),
            parties.iter().map(TestFixture::address).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_wrong_chain_fails() {
        let fixture = TestFixture::with_seed([7; 32]);
        let mut tx = sample_tx();
        fixture.sign(&mut tx, 0);
        assert!(!verify_tx_signature(&tx, "other-chain", &tx.signatures()[0]));
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }
}
