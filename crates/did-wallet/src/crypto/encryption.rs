//! ChaCha20-Poly1305 sealing of store payloads.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{IdentityError, Result};

pub const NONCE_LEN: usize = 12;

/// An encrypted payload and the nonce it was sealed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    /// Encrypt `plaintext` under `key` with a fresh random nonce.
    pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Self> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = cipher(key)?
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| IdentityError::StorageFailure(format!("encrypt: {e}")))?;
        Ok(Self { nonce, ciphertext })
    }

    /// Rebuild from stored parts, checking the nonce length.
    pub fn from_parts(nonce: &[u8], ciphertext: Vec<u8>) -> Result<Self> {
        let nonce = nonce.try_into().map_err(|_| {
            IdentityError::StorageFailure(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce.len()
            ))
        })?;
        Ok(Self { nonce, ciphertext })
    }

    /// Decrypt and authenticate.
    ///
    /// A wrong key and a tampered ciphertext are indistinguishable and both
    /// surface as [`IdentityError::InvalidPassphrase`].
    pub fn open(&self, key: &[u8; 32]) -> Result<Zeroizing<Vec<u8>>> {
        cipher(key)?
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| IdentityError::InvalidPassphrase)
    }
}

fn cipher(key: &[u8; 32]) -> Result<ChaCha20Poly1305> {
    ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| IdentityError::StorageFailure(format!("cipher init: {e}")))
}
