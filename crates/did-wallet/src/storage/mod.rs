//! Secure key storage.
//!
//! The wallet core never encrypts anything itself; it talks to a
//! [`KeyStore`], an opaque key-value store keyed by
//! `(Scope, RecordKind, id)` whose values are serialized records. Two
//! implementations ship with the crate:
//!
//! - [`MemoryKeyStore`] — process-local, for tests and embedding.
//! - [`FileKeyStore`] — one encrypted JSON file per record.
//!
//! [`RecordStore`] layers typed access on top of any `KeyStore`.
//!
//! # Directory layout (`FileKeyStore`)
//!
//! ```text
//! {root}/
//! ├── keystore.json                 — salt + passphrase check value
//! └── {hex(scope)}/
//!     ├── my_did/{hex(did)}.json
//!     ├── their_did/{hex(did)}.json
//!     ├── endpoint/{hex(did)}.json
//!     └── metadata/{hex(did)}.json
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod file;
pub mod memory;
pub mod records;

pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;
pub use records::RecordStore;

/// Owner scope that partitions records inside one store (a wallet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope(pub String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Kinds of record kept per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// Own identity with private key material.
    MyDid,
    /// Pairwise peer identity, public data only.
    TheirDid,
    Endpoint,
    Metadata,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::MyDid,
        RecordKind::TheirDid,
        RecordKind::Endpoint,
        RecordKind::Metadata,
    ];

    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MyDid => "my_did",
            Self::TheirDid => "their_did",
            Self::Endpoint => "endpoint",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key-value storage for wallet records.
///
/// Every method is a suspension point. A single `add`, `upsert`, or
/// `update` call is the unit of atomicity: readers observe either the old
/// or the new value, never a mix.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// `WalletItemAlreadyExists` if a record with this id exists.
    async fn add(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()>;

    /// Fetch a record, `None` if absent.
    async fn get(&self, scope: &Scope, kind: RecordKind, id: &str) -> Result<Option<String>>;

    /// Insert or replace a record.
    async fn upsert(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()>;

    /// Replace an existing record.
    ///
    /// # Errors
    ///
    /// `WalletItemNotFound` if no record with this id exists.
    async fn update(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()>;

    /// List `(id, value)` pairs of one kind. Order is unspecified.
    async fn list(&self, scope: &Scope, kind: RecordKind) -> Result<Vec<(String, String)>>;
}
