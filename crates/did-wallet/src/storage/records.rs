//! Typed record access on top of a [`KeyStore`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroize;

use crate::error::{IdentityError, Result};
use crate::identity::{DidRecord, EndpointRecord, MetadataRecord, PairwiseDidRecord};
use crate::storage::{KeyStore, RecordKind, Scope};

/// Serializes wallet records to JSON and routes them to the right
/// [`RecordKind`] of the underlying store.
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn KeyStore>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

impl RecordStore {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    // ── Generic helpers ───────────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        scope: &Scope,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<T>> {
        let Some(mut raw) = self.store.get(scope, kind, id).await? else {
            return Ok(None);
        };
        let parsed = serde_json::from_str(&raw);
        raw.zeroize();
        parsed.map(Some).map_err(|e| {
            IdentityError::SerializationError(format!("corrupt {kind} record {id}: {e}"))
        })
    }

    async fn put_json<T: Serialize>(
        &self,
        scope: &Scope,
        kind: RecordKind,
        id: &str,
        record: &T,
    ) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.store.upsert(scope, kind, id, &json).await
    }

    // ── Own identities ────────────────────────────────────────────────────────

    pub async fn own(&self, scope: &Scope, did: &str) -> Result<Option<DidRecord>> {
        self.get_json(scope, RecordKind::MyDid, did).await
    }

    /// Fetch an own identity or fail with `WalletItemNotFound`.
    pub async fn require_own(&self, scope: &Scope, did: &str) -> Result<DidRecord> {
        self.own(scope, did)
            .await?
            .ok_or_else(|| IdentityError::WalletItemNotFound(format!("my did {did}")))
    }

    /// Insert a new own identity.
    ///
    /// # Errors
    ///
    /// `WalletItemAlreadyExists` if the DID is already stored.
    pub async fn add_own(&self, scope: &Scope, record: &DidRecord) -> Result<()> {
        let mut json = serde_json::to_string(record)?;
        let result = self
            .store
            .add(scope, RecordKind::MyDid, &record.did, &json)
            .await;
        json.zeroize();
        result
    }

    pub async fn put_own(&self, scope: &Scope, record: &DidRecord) -> Result<()> {
        let mut json = serde_json::to_string(record)?;
        let result = self
            .store
            .upsert(scope, RecordKind::MyDid, &record.did, &json)
            .await;
        json.zeroize();
        result
    }

    /// Read an own identity, apply `change`, and write it back with one
    /// `update` call.
    ///
    /// Nothing is written if `change` fails.
    pub async fn modify_own<F, T>(&self, scope: &Scope, did: &str, change: F) -> Result<T>
    where
        F: FnOnce(&mut DidRecord) -> Result<T> + Send,
        T: Send,
    {
        let mut record = self.require_own(scope, did).await?;
        let out = change(&mut record)?;
        let mut json = serde_json::to_string(&record)?;
        let result = self
            .store
            .update(scope, RecordKind::MyDid, did, &json)
            .await;
        json.zeroize();
        result.map(|()| out)
    }

    pub async fn list_own(&self, scope: &Scope) -> Result<Vec<DidRecord>> {
        let mut records = Vec::new();
        for (id, mut raw) in self.store.list(scope, RecordKind::MyDid).await? {
            let parsed = serde_json::from_str(&raw);
            raw.zeroize();
            records.push(parsed.map_err(|e| {
                IdentityError::SerializationError(format!("corrupt my_did record {id}: {e}"))
            })?);
        }
        Ok(records)
    }

    // ── Peer identities ───────────────────────────────────────────────────────

    pub async fn peer(&self, scope: &Scope, did: &str) -> Result<Option<PairwiseDidRecord>> {
        self.get_json(scope, RecordKind::TheirDid, did).await
    }

    pub async fn put_peer(&self, scope: &Scope, record: &PairwiseDidRecord) -> Result<()> {
        self.put_json(scope, RecordKind::TheirDid, &record.did, record)
            .await
    }

    // ── Endpoints ─────────────────────────────────────────────────────────────

    pub async fn endpoint(&self, scope: &Scope, did: &str) -> Result<Option<EndpointRecord>> {
        self.get_json(scope, RecordKind::Endpoint, did).await
    }

    pub async fn put_endpoint(&self, scope: &Scope, record: &EndpointRecord) -> Result<()> {
        self.put_json(scope, RecordKind::Endpoint, &record.did, record)
            .await
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    pub async fn metadata(&self, scope: &Scope, did: &str) -> Result<Option<String>> {
        Ok(self
            .get_json::<MetadataRecord>(scope, RecordKind::Metadata, did)
            .await?
            .map(|r| r.metadata))
    }

    pub async fn put_metadata(&self, scope: &Scope, did: &str, metadata: &str) -> Result<()> {
        let record = MetadataRecord {
            did: did.to_string(),
            metadata: metadata.to_string(),
        };
        self.put_json(scope, RecordKind::Metadata, did, &record)
            .await
    }
}
