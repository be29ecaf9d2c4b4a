//! Stored identity records and the key-rotation state machine.
//!
//! A [`DidRecord`] holds the caller's own key material. Its `verkey` is
//! always the key that is active for signing. A rotation stages a
//! [`PendingKey`] next to it; the pending verkey and signkey live in one
//! field so a record can never hold half of a pending pair.
//!
//! ```text
//!            begin_rotation (overwrites pending)
//!              ┌──────────┐
//!              │          ▼
//!   Stable ──begin──▶ RotationPending ──commit──▶ Stable (new key active)
//!     ▲                    │
//!     └──────abort─────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoType, KeyPair, SignKey};
use crate::error::{IdentityError, Result};

/// Rotation state of an own DID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationState {
    Stable,
    RotationPending,
}

/// A staged key pair awaiting `commit_rotation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingKey {
    pub verkey: String,
    pub signkey: SignKey,
    #[serde(default)]
    pub crypto_type: CryptoType,
}

/// An own identity: DID plus private key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidRecord {
    pub did: String,
    pub verkey: String,
    pub signkey: SignKey,
    #[serde(default)]
    pub crypto_type: CryptoType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingKey>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl DidRecord {
    /// Build a fresh record from a generated key pair.
    pub fn new(did: String, key_pair: KeyPair) -> Self {
        let now = crate::time::now_micros();
        Self {
            did,
            verkey: key_pair.verkey,
            signkey: key_pair.signkey,
            crypto_type: key_pair.crypto_type,
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current rotation state.
    pub fn state(&self) -> RotationState {
        if self.pending.is_some() {
            RotationState::RotationPending
        } else {
            RotationState::Stable
        }
    }

    /// The staged verkey, if a rotation is in progress.
    pub fn temp_verkey(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.verkey.as_str())
    }

    /// Replace the active keys immediately, discarding any pending rotation.
    pub fn replace_keys(&mut self, key_pair: KeyPair) {
        self.verkey = key_pair.verkey;
        self.signkey = key_pair.signkey;
        self.crypto_type = key_pair.crypto_type;
        self.pending = None;
        self.touch();
    }

    /// Stage a new key pair. Restarting while pending overwrites the staged
    /// pair; the active key is never touched.
    pub fn begin_rotation(&mut self, key_pair: KeyPair) -> &str {
        self.touch();
        let pending = self.pending.insert(PendingKey {
            verkey: key_pair.verkey,
            signkey: key_pair.signkey,
            crypto_type: key_pair.crypto_type,
        });
        &pending.verkey
    }

    /// Promote the staged pair to active.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::WalletItemNotFound` if no rotation is pending.
    pub fn commit_rotation(&mut self) -> Result<()> {
        let pending = self.pending.take().ok_or_else(|| {
            IdentityError::WalletItemNotFound(format!("no pending rotation for did {}", self.did))
        })?;
        self.verkey = pending.verkey;
        self.signkey = pending.signkey;
        self.crypto_type = pending.crypto_type;
        self.touch();
        Ok(())
    }

    /// Drop the staged pair, keeping the active key.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::WalletItemNotFound` if no rotation is pending.
    pub fn abort_rotation(&mut self) -> Result<()> {
        if self.pending.take().is_none() {
            return Err(IdentityError::WalletItemNotFound(format!(
                "no pending rotation for did {}",
                self.did
            )));
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = crate::time::now_micros();
    }
}

/// A counterparty's DID and verkey (public data only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDidRecord {
    pub did: String,
    pub verkey: String,
    #[serde(default)]
    pub updated_at: u64,
}

impl PairwiseDidRecord {
    pub fn new(did: String, verkey: String) -> Self {
        Self {
            did,
            verkey,
            updated_at: crate::time::now_micros(),
        }
    }
}

/// A service endpoint for a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub transport_verkey: String,
}

/// Stored form of an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub did: String,
    #[serde(flatten)]
    pub endpoint: Endpoint,
    #[serde(default)]
    pub updated_at: u64,
}

impl EndpointRecord {
    pub fn new(did: String, endpoint: Endpoint) -> Self {
        Self {
            did,
            endpoint,
            updated_at: crate::time::now_micros(),
        }
    }
}

/// Opaque metadata attached to a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub did: String,
    pub metadata: String,
}

/// Public view of an own identity. Never contains private key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnIdentity {
    pub did: String,
    pub verkey: String,
    #[serde(rename = "tempVerkey", skip_serializing_if = "Option::is_none")]
    pub temp_verkey: Option<String>,
    pub metadata: Option<String>,
}

impl OwnIdentity {
    pub fn from_record(record: &DidRecord, metadata: Option<String>) -> Self {
        Self {
            did: record.did.clone(),
            verkey: record.verkey.clone(),
            temp_verkey: record.temp_verkey().map(str::to_string),
            metadata,
        }
    }
}
