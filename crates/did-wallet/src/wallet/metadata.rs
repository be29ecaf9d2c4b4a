//! Opaque per-DID metadata.

use crate::did;
use crate::error::Result;
use crate::storage::Scope;

use super::DidWallet;

impl DidWallet {
    /// Attach `metadata` to `did`, replacing any previous value.
    ///
    /// Works for own and peer DIDs alike; the DID only has to be well formed.
    pub async fn set_metadata(&self, scope: &Scope, did: &str, metadata: &str) -> Result<()> {
        did::validate_did(did).map_err(|e| e.during("set_metadata"))?;
        self.records
            .put_metadata(scope, did, metadata)
            .await
            .map_err(|e| e.during("set_metadata"))
    }

    /// Metadata of `did`, `None` if never set.
    pub async fn get_metadata(&self, scope: &Scope, did: &str) -> Result<Option<String>> {
        did::validate_did(did).map_err(|e| e.during("get_metadata"))?;
        self.records
            .metadata(scope, did)
            .await
            .map_err(|e| e.during("get_metadata"))
    }
}
