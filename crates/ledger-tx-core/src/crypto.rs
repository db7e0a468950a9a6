//! Key and signature types carried by transactions.
//!
//! The core never signs or verifies. These are fixed-size byte wrappers
//! handed to the external signature module, plus address derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Address, ADDRESS_LEN};

/// Domain prefix for deriving an address from an Ed25519 public key.
pub const ED25519_ADDRESS_DOMAIN: &[u8] = b"sigs/ed25519/";

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// Derive the on-chain address controlled by this key.
    ///
    /// `blake3(ED25519_ADDRESS_DOMAIN || pubkey)`, truncated to 20 bytes.
    pub fn address(&self) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ED25519_ADDRESS_DOMAIN);
        hasher.update(&self.0);
        let hash = hasher.finalize();
        Address::from(&hash.as_bytes()[..ADDRESS_LEN])
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Ed25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The zero signature (invalid, used as placeholder).
    pub const ZERO: Self = Self([0u8; 64]);
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_derivation_deterministic() {
        let pk = Ed25519PublicKey::from_bytes([0x42; 32]);
        let a1 = pk.address();
        let a2 = pk.address();
        assert_eq!(a1, a2);
        assert_eq!(a1.len(), ADDRESS_LEN);
        assert!(a1.validate("owner").is_ok());
    }

    #[test]
    fn test_different_keys_different_addresses() {
        let a1 = Ed25519PublicKey::from_bytes([0x01; 32]).address();
        let a2 = Ed25519PublicKey::from_bytes([0x02; 32]).address();
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Ed25519PublicKey::from_bytes([0xab; 32]);
        let recovered = Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
    }

    #[test]
    fn test_public_key_hex_wrong_length() {
        assert!(Ed25519PublicKey::from_hex("abcd").is_err());
    }
}
