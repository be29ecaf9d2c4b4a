//! Encrypted file-backed [`KeyStore`].
//!
//! Every record is stored as its own JSON envelope, encrypted with
//! ChaCha20-Poly1305 under a key derived from the wallet passphrase:
//!
//! ```text
//! passphrase → Argon2id(passphrase, salt) → master_key
//! HKDF-SHA256(master_key, "did-wallet/record-encryption") → record_key
//! ```
//!
//! The id is encrypted together with the value, so an envelope moved to a
//! different file name is detected on read.
//!
//! Store header (`keystore.json`):
//! ```json
//! {
//!     "version": 1,
//!     "format": "didw-keystore-v1",
//!     "algorithm": "chacha20-poly1305",
//!     "kdf": "argon2id",
//!     "salt": "<base64-16-bytes>",
//!     "check_nonce": "<base64-12-bytes>",
//!     "check": "<base64-ciphertext>"
//! }
//! ```
//!
//! Record envelope (`{hex(scope)}/{kind}/{hex(id)}.json`):
//! ```json
//! { "version": 1, "nonce": "<base64>", "ciphertext": "<base64>" }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::derivation::{self, StoreKeys, SALT_LEN};
use crate::crypto::encryption::Sealed;
use crate::error::{IdentityError, Result};
use crate::storage::{KeyStore, RecordKind, Scope};

// ── File format constants ─────────────────────────────────────────────────────

const STORE_VERSION: u32 = 1;
const STORE_FORMAT: &str = "didw-keystore-v1";
const STORE_ALGORITHM: &str = "chacha20-poly1305";
const STORE_KDF: &str = "argon2id";
const HEADER_FILE: &str = "keystore.json";
const CHECK_PLAINTEXT: &[u8] = b"did-wallet passphrase check";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Store header written once when the store is created.
#[derive(Debug, Serialize, Deserialize)]
struct StoreHeader {
    version: u32,
    format: String,
    algorithm: String,
    kdf: String,
    salt: String,
    check_nonce: String,
    check: String,
}

/// Encrypted record envelope.
#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    version: u32,
    nonce: String,
    ciphertext: String,
}

/// Plaintext inside an envelope.
#[derive(Serialize, Deserialize, Zeroize)]
struct RecordPlaintext {
    id: String,
    value: String,
}

// ── FileKeyStore ──────────────────────────────────────────────────────────────

/// Filesystem-backed store with per-record encryption.
pub struct FileKeyStore {
    root: PathBuf,
    record_key: Zeroizing<[u8; 32]>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for FileKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeyStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FileKeyStore {
    /// Open the store at `root`, creating it if no header exists.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidPassphrase` if the store exists and the
    /// passphrase does not match, `IdentityError::StorageFailure` for
    /// filesystem errors or a malformed header.
    pub fn open(root: impl Into<PathBuf>, passphrase: &str) -> Result<Self> {
        let root = root.into();
        let header_path = root.join(HEADER_FILE);

        let record_key = if header_path.exists() {
            let header: StoreHeader = serde_json::from_slice(&std::fs::read(&header_path)?)
                .map_err(|e| {
                    IdentityError::StorageFailure(format!("failed to parse {HEADER_FILE}: {e}"))
                })?;
            if header.version != STORE_VERSION || header.format != STORE_FORMAT {
                return Err(IdentityError::StorageFailure(format!(
                    "unsupported key store version={} format={}",
                    header.version, header.format
                )));
            }
            let salt: [u8; SALT_LEN] = decode_b64(&header.salt, "salt")?
                .try_into()
                .map_err(|_| IdentityError::StorageFailure("salt must be 16 bytes".into()))?;
            let keys = StoreKeys::derive(passphrase, &salt)?;
            Sealed::from_parts(
                &decode_b64(&header.check_nonce, "check nonce")?,
                decode_b64(&header.check, "check value")?,
            )?
            .open(&keys.check)?;
            keys.record
        } else {
            std::fs::create_dir_all(&root)?;
            let salt = derivation::new_salt();
            let keys = StoreKeys::derive(passphrase, &salt)?;
            let check = Sealed::seal(&keys.check, CHECK_PLAINTEXT)?;
            let header = StoreHeader {
                version: STORE_VERSION,
                format: STORE_FORMAT.to_string(),
                algorithm: STORE_ALGORITHM.to_string(),
                kdf: STORE_KDF.to_string(),
                salt: encode_b64(&salt),
                check_nonce: encode_b64(&check.nonce),
                check: encode_b64(&check.ciphertext),
            };
            let json = serde_json::to_string_pretty(&header)?;
            write_atomic(&header_path, json.as_bytes())?;
            log::info!("created key store at {}", root.display());
            keys.record
        };

        Ok(Self {
            root,
            record_key,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, scope: &Scope, kind: RecordKind) -> PathBuf {
        self.root
            .join(hex::encode(scope.as_str()))
            .join(kind.as_str())
    }

    fn record_path(&self, scope: &Scope, kind: RecordKind, id: &str) -> PathBuf {
        self.kind_dir(scope, kind)
            .join(format!("{}.json", hex::encode(id)))
    }

    fn seal(&self, id: &str, value: &str) -> Result<Vec<u8>> {
        let mut plaintext = RecordPlaintext {
            id: id.to_string(),
            value: value.to_string(),
        };
        let mut bytes = serde_json::to_vec(&plaintext)?;
        plaintext.zeroize();
        let sealed = Sealed::seal(&self.record_key, &bytes);
        bytes.zeroize();
        let sealed = sealed?;

        let envelope = RecordEnvelope {
            version: STORE_VERSION,
            nonce: encode_b64(&sealed.nonce),
            ciphertext: encode_b64(&sealed.ciphertext),
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    fn open_envelope(&self, path: &Path) -> Result<RecordPlaintext> {
        let envelope: RecordEnvelope = serde_json::from_slice(&std::fs::read(path)?)
            .map_err(|e| {
                IdentityError::StorageFailure(format!(
                    "failed to parse record {}: {e}",
                    path.display()
                ))
            })?;
        if envelope.version != STORE_VERSION {
            return Err(IdentityError::StorageFailure(format!(
                "unsupported record version {} in {}",
                envelope.version,
                path.display()
            )));
        }
        let bytes = Sealed::from_parts(
            &decode_b64(&envelope.nonce, "nonce")?,
            decode_b64(&envelope.ciphertext, "ciphertext")?,
        )?
        .open(&self.record_key)
        .map_err(|_| {
            IdentityError::StorageFailure(format!(
                "record {} failed authentication",
                path.display()
            ))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| IdentityError::StorageFailure(format!("record payload: {e}")))
    }

    fn read(&self, scope: &Scope, kind: RecordKind, id: &str) -> Result<Option<String>> {
        let path = self.record_path(scope, kind, id);
        if !path.exists() {
            return Ok(None);
        }
        let mut plaintext = self.open_envelope(&path)?;
        if plaintext.id != id {
            plaintext.zeroize();
            return Err(IdentityError::StorageFailure(format!(
                "record {} does not belong to id {id}",
                path.display()
            )));
        }
        Ok(Some(std::mem::take(&mut plaintext.value)))
    }

    fn write(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let sealed = self.seal(id, value)?;
        write_atomic(&self.record_path(scope, kind, id), &sealed)
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn add(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.record_path(scope, kind, id).exists() {
            return Err(IdentityError::WalletItemAlreadyExists(format!(
                "{kind} {id} in scope {scope}"
            )));
        }
        self.write(scope, kind, id, value)
    }

    async fn get(&self, scope: &Scope, kind: RecordKind, id: &str) -> Result<Option<String>> {
        self.read(scope, kind, id)
    }

    async fn upsert(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(scope, kind, id, value)
    }

    async fn update(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !self.record_path(scope, kind, id).exists() {
            return Err(IdentityError::WalletItemNotFound(format!(
                "{kind} {id} in scope {scope}"
            )));
        }
        self.write(scope, kind, id, value)
    }

    async fn list(&self, scope: &Scope, kind: RecordKind) -> Result<Vec<(String, String)>> {
        let dir = self.kind_dir(scope, kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let mut plaintext = self.open_envelope(&path)?;
            records.push((
                std::mem::take(&mut plaintext.id),
                std::mem::take(&mut plaintext.value),
            ));
        }
        Ok(records)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn encode_b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|e| IdentityError::StorageFailure(format!("invalid {what} base64: {e}")))
}

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
