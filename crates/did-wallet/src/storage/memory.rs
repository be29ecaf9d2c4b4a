//! In-memory [`KeyStore`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{IdentityError, Result};
use crate::storage::{KeyStore, RecordKind, Scope};

type RecordKey = (Scope, RecordKind, String);

/// Process-local store. Records are lost when it is dropped.
///
/// `list` yields records ordered by id.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    records: RwLock<BTreeMap<RecordKey, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all scopes and kinds.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn key(scope: &Scope, kind: RecordKind, id: &str) -> RecordKey {
    (scope.clone(), kind, id.to_string())
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn add(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let k = key(scope, kind, id);
        if records.contains_key(&k) {
            return Err(IdentityError::WalletItemAlreadyExists(format!(
                "{kind} {id} in scope {scope}"
            )));
        }
        records.insert(k, value.to_string());
        Ok(())
    }

    async fn get(&self, scope: &Scope, kind: RecordKind, id: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(&key(scope, kind, id)).cloned())
    }

    async fn upsert(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(key(scope, kind, id), value.to_string());
        Ok(())
    }

    async fn update(&self, scope: &Scope, kind: RecordKind, id: &str, value: &str) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&key(scope, kind, id)) {
            Some(existing) => {
                *existing = value.to_string();
                Ok(())
            }
            None => Err(IdentityError::WalletItemNotFound(format!(
                "{kind} {id} in scope {scope}"
            ))),
        }
    }

    async fn list(&self, scope: &Scope, kind: RecordKind) -> Result<Vec<(String, String)>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|((s, k, _), _)| s == scope && *k == kind)
            .map(|((_, _, id), value)| (id.clone(), value.clone()))
            .collect())
    }
}
