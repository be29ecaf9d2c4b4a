//! Key seeds.
//!
//! A seed is accepted in three textual forms:
//! - exactly 32 bytes of UTF-8, used verbatim;
//! - 64 hex characters;
//! - base64 ending in `=` that decodes to 32 bytes.

use std::fmt;

use base64::Engine;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{IdentityError, Result};

/// A 32-byte secret key seed, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Wrap raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse a seed from its textual configuration form.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.as_bytes();
        if raw.len() == 32 {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(raw);
            return Ok(Self(bytes));
        }

        let mut decoded = if raw.len() == 64 && raw.iter().all(u8::is_ascii_hexdigit) {
            hex::decode(text)
                .map_err(|e| IdentityError::InvalidStructure(format!("invalid hex seed: {e}")))?
        } else if text.ends_with('=') {
            base64::engine::general_purpose::STANDARD
                .decode(text)
                .map_err(|e| IdentityError::InvalidStructure(format!("invalid base64 seed: {e}")))?
        } else {
            return Err(IdentityError::InvalidStructure(format!(
                "seed must be 32 bytes, 64 hex characters, or base64; got {} characters",
                raw.len()
            )));
        };

        let result = <[u8; 32]>::try_from(decoded.as_slice()).map_err(|_| {
            IdentityError::InvalidStructure(format!(
                "decoded seed must be 32 bytes, got {}",
                decoded.len()
            ))
        });
        decoded.zeroize();
        result.map(Self)
    }

    /// Borrow the raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}
