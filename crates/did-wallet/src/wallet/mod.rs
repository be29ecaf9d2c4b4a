//! The wallet façade.
//!
//! [`DidWallet`] ties the three collaborators together: a [`KeyStore`] for
//! durable records, a [`Registry`] for authoritative lookups, and a
//! [`CryptoProvider`] for key generation and signing. Operations are split
//! across submodules by concern:
//!
//! - `own` — own identities and the rotation state machine
//! - `peer` — pairwise (their) identities
//! - `resolve` — DID → verkey resolution
//! - `endpoint` — per-DID service endpoints
//! - `metadata` — opaque per-DID metadata
//!
//! Every operation is an `async fn` that resolves exactly once. The only
//! suspension points are store and registry calls, and every operation
//! writes at most one record.

use std::sync::Arc;

use crate::crypto::{CryptoProvider, Ed25519Provider};
use crate::registry::{NoRegistry, Registry};
use crate::storage::{KeyStore, MemoryKeyStore, RecordStore};

mod endpoint;
mod metadata;
mod own;
mod peer;
mod resolve;

/// Manages own and peer DIDs for any number of scopes.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct DidWallet {
    records: RecordStore,
    registry: Arc<dyn Registry>,
    crypto: Arc<dyn CryptoProvider>,
}

impl std::fmt::Debug for DidWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidWallet").finish_non_exhaustive()
    }
}

impl DidWallet {
    /// Build a wallet over `store` and `registry` using Ed25519 keys.
    pub fn new(store: Arc<dyn KeyStore>, registry: Arc<dyn Registry>) -> Self {
        Self {
            records: RecordStore::new(store),
            registry,
            crypto: Arc::new(Ed25519Provider),
        }
    }

    /// Wallet backed by a [`MemoryKeyStore`] with no registry configured.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyStore::new()), Arc::new(NoRegistry))
    }

    /// Replace the crypto provider.
    pub fn with_crypto(mut self, crypto: Arc<dyn CryptoProvider>) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }
}
