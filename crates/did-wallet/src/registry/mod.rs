//! Authoritative registry (ledger) client seam.
//!
//! The wallet only ever asks a registry two questions: what verkey and what
//! endpoint is published for a DID. [`MemoryRegistry`] answers them from an
//! in-process table, optionally loaded from and saved to a JSON snapshot:
//!
//! ```json
//! {
//!     "version": 1,
//!     "entries": {
//!         "<did>": { "verkey": "...", "endpoint": { "address": "...", "transport_verkey": "..." } }
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{IdentityError, Result};
use crate::identity::Endpoint;

const SNAPSHOT_VERSION: u32 = 1;

/// Resolves DIDs against the authoritative source.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Published verkey for `did`, full or `~`-abbreviated; `None` if the
    /// DID is not published.
    async fn resolve_verkey(&self, did: &str) -> Result<Option<String>>;

    /// Published endpoint for `did`, `None` if none is published.
    async fn resolve_endpoint(&self, did: &str) -> Result<Option<Endpoint>>;
}

/// A registry that is never reachable.
///
/// Local resolution keeps working; every fresh resolution fails with
/// `RegistryUnavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

#[async_trait]
impl Registry for NoRegistry {
    async fn resolve_verkey(&self, did: &str) -> Result<Option<String>> {
        Err(IdentityError::RegistryUnavailable(format!(
            "no registry configured to resolve {did}"
        )))
    }

    async fn resolve_endpoint(&self, did: &str) -> Result<Option<Endpoint>> {
        Err(IdentityError::RegistryUnavailable(format!(
            "no registry configured to resolve endpoint of {did}"
        )))
    }
}

/// What the registry publishes for one DID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, RegistryEntry>,
}

/// In-process registry.
///
/// Counts lookups so callers can assert that local resolution never reaches
/// it, and can be switched offline to simulate an unreachable ledger.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<BTreeMap<String, RegistryEntry>>,
    lookups: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) the verkey for `did`.
    pub async fn publish_verkey(&self, did: impl Into<String>, verkey: impl Into<String>) {
        self.entries
            .write()
            .await
            .entry(did.into())
            .or_default()
            .verkey = Some(verkey.into());
    }

    /// Publish (or replace) the endpoint for `did`.
    pub async fn publish_endpoint(&self, did: impl Into<String>, endpoint: Endpoint) {
        self.entries
            .write()
            .await
            .entry(did.into())
            .or_default()
            .endpoint = Some(endpoint);
    }

    /// Current entry for `did`, without counting a lookup.
    pub async fn entry(&self, did: &str) -> Option<RegistryEntry> {
        self.entries.read().await.get(did).cloned()
    }

    /// Number of `resolve_*` calls served so far, including failed ones.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every subsequent lookup fail with `RegistryUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Load a registry from a JSON snapshot. A missing file yields an empty
    /// registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let snapshot: Snapshot = serde_json::from_slice(&std::fs::read(path)?)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IdentityError::SerializationError(format!(
                "unsupported registry snapshot version {}",
                snapshot.version
            )));
        }
        log::debug!(
            "loaded {} registry entries from {}",
            snapshot.entries.len(),
            path.display()
        );
        Ok(Self {
            entries: RwLock::new(snapshot.entries),
            ..Self::default()
        })
    }

    /// Save the registry as a JSON snapshot (temp file + rename).
    pub async fn save(&self, path: &Path) -> Result<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries: self.entries.read().await.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn check_online(&self, did: &str) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(IdentityError::RegistryUnavailable(format!(
                "registry offline while resolving {did}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn resolve_verkey(&self, did: &str) -> Result<Option<String>> {
        self.check_online(did)?;
        Ok(self
            .entries
            .read()
            .await
            .get(did)
            .and_then(|e| e.verkey.clone()))
    }

    async fn resolve_endpoint(&self, did: &str) -> Result<Option<Endpoint>> {
        self.check_online(did)?;
        Ok(self
            .entries
            .read()
            .await
            .get(did)
            .and_then(|e| e.endpoint.clone()))
    }
}
