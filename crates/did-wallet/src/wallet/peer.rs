//! Pairwise (their) identities.

use crate::did;
use crate::error::{IdentityError, Result};
use crate::identity::{PairwiseDidRecord, PeerIdentityRequest};
use crate::storage::Scope;

use super::DidWallet;

impl DidWallet {
    /// Store a counterparty's DID and verkey, replacing any previous record.
    ///
    /// An abbreviated verkey is expanded against the DID before storage; an
    /// absent verkey makes the DID its own verkey (a cryptonym). No proof of
    /// possession is required.
    ///
    /// # Errors
    ///
    /// `InvalidStructure` for a malformed DID or verkey.
    pub async fn store_peer_identity(
        &self,
        scope: &Scope,
        request: &PeerIdentityRequest,
    ) -> Result<()> {
        let did = request.did.as_str();
        did::validate_did(did).map_err(|e| e.during("store_peer_identity"))?;
        let verkey = did::full_verkey(did, request.verkey.as_deref())
            .map_err(|e| e.during("store_peer_identity"))?;

        self.records
            .put_peer(scope, &PairwiseDidRecord::new(did.to_string(), verkey))
            .await
            .map_err(|e| e.during("store_peer_identity"))?;
        log::debug!("stored peer did {did} in scope {scope}");
        Ok(())
    }

    /// Fetch a stored peer identity.
    pub async fn get_peer_identity(&self, scope: &Scope, did: &str) -> Result<PairwiseDidRecord> {
        self.records
            .peer(scope, did)
            .await
            .map_err(|e| e.during("get_peer_identity"))?
            .ok_or_else(|| IdentityError::WalletItemNotFound(format!("their did {did}")))
    }
}
