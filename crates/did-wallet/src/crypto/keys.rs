//! Ed25519 key pair generation behind the [`CryptoProvider`] seam.
//!
//! Verkeys are the base58 encoding of the 32-byte Ed25519 public key.
//! Signkeys are the 32-byte Ed25519 secret seed and are zeroized on drop.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::seed::Seed;
use crate::error::{IdentityError, Result};

/// Signature algorithms understood by the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoType {
    #[default]
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl CryptoType {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }
}

impl FromStr for CryptoType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ed25519" => Ok(Self::Ed25519),
            other => Err(IdentityError::InvalidStructure(format!(
                "unsupported crypto_type: {other}"
            ))),
        }
    }
}

impl fmt::Display for CryptoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private signing key material.
///
/// Serialized as base58 so that it can live inside a stored record; the
/// store is responsible for encrypting it at rest.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SignKey([u8; 32]);

impl SignKey {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Build the ed25519-dalek signing key.
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }
}

impl fmt::Debug for SignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignKey(<redacted>)")
    }
}

impl PartialEq for SignKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SignKey {}

impl Serialize for SignKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut encoded = bs58::encode(&self.0).into_string();
        let result = serializer.serialize_str(&encoded);
        encoded.zeroize();
        result
    }
}

impl<'de> Deserialize<'de> for SignKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut encoded = String::deserialize(deserializer)?;
        let decoded = bs58::decode(&encoded).into_vec();
        encoded.zeroize();
        let mut bytes = decoded.map_err(serde::de::Error::custom)?;
        let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            serde::de::Error::custom(format!("signkey must be 32 bytes, got {}", bytes.len()))
        })?;
        bytes.zeroize();
        Ok(Self(key))
    }
}

/// A generated key pair: public verkey plus private signkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub verkey: String,
    pub signkey: SignKey,
    pub crypto_type: CryptoType,
}

/// Encode a verifying key as a verkey string.
pub fn encode_verkey(key: &VerifyingKey) -> String {
    bs58::encode(key.as_bytes()).into_string()
}

/// Decode a full verkey (optionally suffixed with `:ed25519`) into an
/// ed25519-dalek verifying key.
pub fn decode_verkey(verkey: &str) -> Result<VerifyingKey> {
    let key = match verkey.split_once(':') {
        Some((key, crypto_type)) => {
            crypto_type.parse::<CryptoType>()?;
            key
        }
        None => verkey,
    };
    let bytes = bs58::decode(key)
        .into_vec()
        .map_err(|e| IdentityError::InvalidKey(format!("invalid base58 verkey: {e}")))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| IdentityError::InvalidKey("verkey must be 32 bytes".into()))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| IdentityError::InvalidKey(format!("invalid verifying key: {e}")))
}

/// Capability to generate key pairs, sign, and verify.
///
/// Implementations must fail with [`IdentityError::UnsupportedAlgorithm`]
/// for any algorithm they do not handle.
pub trait CryptoProvider: Send + Sync {
    /// Generate a key pair, deterministically when a seed is supplied.
    fn generate_keypair(&self, seed: Option<&Seed>, crypto_type: CryptoType) -> Result<KeyPair>;

    /// Sign a message with the given private key.
    fn sign(&self, signkey: &SignKey, crypto_type: CryptoType, message: &[u8]) -> Result<Vec<u8>>;

    /// Verify a signature against a full verkey.
    fn verify(&self, verkey: &str, message: &[u8], signature: &[u8]) -> Result<()>;
}

/// Default provider backed by ed25519-dalek.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl CryptoProvider for Ed25519Provider {
    fn generate_keypair(&self, seed: Option<&Seed>, crypto_type: CryptoType) -> Result<KeyPair> {
        match crypto_type {
            CryptoType::Ed25519 => {}
        }
        let signing_key = match seed {
            Some(seed) => SigningKey::from_bytes(seed.as_bytes()),
            None => SigningKey::generate(&mut rand::thread_rng()),
        };
        let verkey = encode_verkey(&signing_key.verifying_key());
        Ok(KeyPair {
            verkey,
            signkey: SignKey::from_bytes(signing_key.to_bytes()),
            crypto_type,
        })
    }

    fn sign(&self, signkey: &SignKey, crypto_type: CryptoType, message: &[u8]) -> Result<Vec<u8>> {
        match crypto_type {
            CryptoType::Ed25519 => Ok(signkey.signing_key().sign(message).to_bytes().to_vec()),
        }
    }

    fn verify(&self, verkey: &str, message: &[u8], signature: &[u8]) -> Result<()> {
        let key = decode_verkey(verkey)?;
        let signature: [u8; 64] = signature
            .try_into()
            .map_err(|_| IdentityError::InvalidKey("signature must be 64 bytes".into()))?;
        key.verify(message, &Signature::from_bytes(&signature))
            .map_err(|_| IdentityError::SignatureInvalid)
    }
}
