//! DID → verkey resolution against local storage and the registry.

use crate::did;
use crate::error::{IdentityError, Result};
use crate::identity::{DidRecord, PairwiseDidRecord};
use crate::resolve::{self, Cached, Freshness, Resolution, Source};
use crate::storage::Scope;
use crate::time::now_micros;

use super::DidWallet;

impl DidWallet {
    /// Resolve the current verkey of `did`.
    ///
    /// With `fresh == false` only local storage is read. With `fresh == true`
    /// the registry is consulted and a differing answer replaces the cached
    /// peer verkey.
    pub async fn resolve_key(&self, scope: &Scope, did: &str, fresh: bool) -> Result<String> {
        Ok(self.resolve(scope, did, fresh.into()).await?.value)
    }

    /// Resolve `did` under an explicit [`Freshness`] policy.
    ///
    /// Peer records are consulted before own records. The registry never
    /// overwrites own key material: for an own DID the active verkey is
    /// returned, marked authoritative only if the registry agrees with it.
    ///
    /// # Errors
    ///
    /// - `WalletItemNotFound` if the DID is unknown locally and, when the
    ///   registry is consulted, not published there either.
    /// - `RegistryUnavailable` or `StorageFailure` from the collaborators.
    pub async fn resolve(
        &self,
        scope: &Scope,
        did: &str,
        freshness: Freshness,
    ) -> Result<Resolution<String>> {
        did::validate_did(did).map_err(|e| e.during("resolve_key"))?;

        let peer = self
            .records
            .peer(scope, did)
            .await
            .map_err(|e| e.during("resolve_key"))?;
        if let Some(peer) = peer {
            let cached = Cached::new(peer.verkey, peer.updated_at);
            return self.resolve_peer(scope, did, Some(cached), freshness).await;
        }
        let own = self
            .records
            .own(scope, did)
            .await
            .map_err(|e| e.during("resolve_key"))?;
        match own {
            Some(own) => self.resolve_own(did, &own, freshness).await,
            None => self.resolve_peer(scope, did, None, freshness).await,
        }
    }

    async fn resolve_peer(
        &self,
        scope: &Scope,
        did: &str,
        local: Option<Cached<String>>,
        freshness: Freshness,
    ) -> Result<Resolution<String>> {
        let now = now_micros();
        if !freshness.needs_refresh(local.as_ref(), now) {
            log::debug!("resolved {did} from local storage");
            return local
                .map(|cached| cached.into_resolution(did))
                .ok_or_else(|| {
                    IdentityError::WalletItemNotFound(format!("did {did} in scope {scope}"))
                });
        }

        let remote = self.fetch_verkey(did).await?;
        let reconciled = resolve::reconcile(did, local, remote, now)
            .map_err(|e| e.during("resolve_key"))?;
        if reconciled.needs_write_back() {
            let value = &reconciled.resolution.value;
            if reconciled.changed {
                log::info!("cached verkey of {did} updated from registry to {value}");
            }
            let mut record = PairwiseDidRecord::new(did.to_string(), value.clone());
            record.updated_at = reconciled.resolution.observed_at;
            self.records
                .put_peer(scope, &record)
                .await
                .map_err(|e| e.during("resolve_key"))?;
        }
        Ok(reconciled.resolution)
    }

    async fn resolve_own(
        &self,
        did: &str,
        record: &DidRecord,
        freshness: Freshness,
    ) -> Result<Resolution<String>> {
        let now = now_micros();
        let cached = Cached::new(record.verkey.clone(), record.updated_at);
        if !freshness.needs_refresh(Some(&cached), now) {
            log::debug!("resolved own did {did} from local storage");
            return Ok(cached.into_resolution(did));
        }

        match self.fetch_verkey(did).await? {
            Some(remote) if remote == cached.value => Ok(Resolution {
                did: did.to_string(),
                value: cached.value,
                source: Source::Authoritative,
                observed_at: now,
            }),
            Some(remote) => {
                log::warn!(
                    "registry publishes {remote} for own did {did}, keeping active verkey {}",
                    cached.value
                );
                Ok(cached.into_resolution(did))
            }
            None => Ok(cached.into_resolution(did)),
        }
    }

    /// Ask the registry for the verkey of `did`, expanding an abbreviated
    /// answer.
    async fn fetch_verkey(&self, did: &str) -> Result<Option<String>> {
        let Some(verkey) = self
            .registry
            .resolve_verkey(did)
            .await
            .map_err(|e| e.during("resolve_key"))?
        else {
            log::debug!("registry has no verkey for {did}");
            return Ok(None);
        };
        did::full_verkey(did, Some(&verkey))
            .map(Some)
            .map_err(|e| e.during("resolve_key"))
    }
}
