//! Key derivation for the encrypted store.
//!
//! ```text
//! passphrase ── Argon2id(salt) ──> master key
//! master key ── HKDF-SHA256(info) ──> one subkey per KeyPurpose
//! ```
//!
//! The master key never keys a cipher directly.

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{IdentityError, Result};

/// Argon2id cost parameters.
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

pub const SALT_LEN: usize = 16;

/// What a derived subkey is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    /// Encrypts record envelopes.
    RecordEncryption,
    /// Encrypts the known value in the store header.
    PassphraseCheck,
}

impl KeyPurpose {
    /// HKDF info string for this purpose.
    pub fn info(self) -> &'static str {
        match self {
            Self::RecordEncryption => "did-wallet/record-encryption",
            Self::PassphraseCheck => "did-wallet/passphrase-check",
        }
    }
}

/// Fresh random salt for a new store.
pub fn new_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Stretch a passphrase into a 32-byte master key.
pub fn stretch_passphrase(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; 32]>> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| IdentityError::StorageFailure(format!("argon2 params: {e}")))?;

    let mut master = Zeroizing::new([0u8; 32]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase, salt, master.as_mut())
        .map_err(|e| IdentityError::StorageFailure(format!("argon2: {e}")))?;
    Ok(master)
}

/// HKDF-SHA256 expansion of `master` for one purpose.
pub fn derive_subkey(master: &[u8; 32], purpose: KeyPurpose) -> Result<Zeroizing<[u8; 32]>> {
    let mut output = Zeroizing::new([0u8; 32]);
    Hkdf::<Sha256>::new(None, master)
        .expand(purpose.info().as_bytes(), output.as_mut())
        .map_err(|e| IdentityError::StorageFailure(format!("hkdf expand: {e}")))?;
    Ok(output)
}

/// The subkeys an open store needs.
pub struct StoreKeys {
    pub record: Zeroizing<[u8; 32]>,
    pub check: Zeroizing<[u8; 32]>,
}

impl StoreKeys {
    /// Derive both subkeys from a passphrase and the store salt.
    pub fn derive(passphrase: &str, salt: &[u8; SALT_LEN]) -> Result<Self> {
        let master = stretch_passphrase(passphrase.as_bytes(), salt)?;
        Ok(Self {
            record: derive_subkey(&master, KeyPurpose::RecordEncryption)?,
            check: derive_subkey(&master, KeyPurpose::PassphraseCheck)?,
        })
    }
}
