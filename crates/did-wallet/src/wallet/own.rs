//! Own identities: creation, two-phase key rotation, and signing.

use crate::did;
use crate::error::Result;
use crate::identity::{DidRecord, IdentityRequest, OwnIdentity, RotationRequest};
use crate::storage::Scope;

use super::DidWallet;

impl DidWallet {
    /// Create an own DID and store its key pair. Returns `(did, verkey)`.
    ///
    /// Without an explicit DID the DID is derived from the first 16 bytes of
    /// the verkey. With an explicit DID that is already stored, the keys are
    /// replaced on the spot and any pending rotation is discarded.
    ///
    /// # Errors
    ///
    /// - `InvalidStructure` for a malformed DID or seed, or an unsupported
    ///   crypto type.
    /// - `WalletItemAlreadyExists` if the derived DID is already stored.
    pub async fn create_identity(
        &self,
        scope: &Scope,
        request: &IdentityRequest,
    ) -> Result<(String, String)> {
        let spec = request
            .key_spec()
            .map_err(|e| e.during("create_identity"))?;
        if let Some(did) = &request.did {
            did::validate_did(did).map_err(|e| e.during("create_identity"))?;
        }

        let key_pair = self
            .crypto
            .generate_keypair(spec.seed.as_ref(), spec.crypto_type)
            .map_err(|e| e.during("create_identity"))?;
        let verkey = key_pair.verkey.clone();

        let did = match &request.did {
            Some(did) => {
                let existing = self
                    .records
                    .own(scope, did)
                    .await
                    .map_err(|e| e.during("create_identity"))?;
                match existing {
                    Some(mut record) => {
                        record.replace_keys(key_pair);
                        self.records
                            .put_own(scope, &record)
                            .await
                            .map_err(|e| e.during("create_identity"))?;
                        log::info!("replaced keys of did {did} in scope {scope}");
                    }
                    None => {
                        self.records
                            .add_own(scope, &DidRecord::new(did.clone(), key_pair))
                            .await
                            .map_err(|e| e.during("create_identity"))?;
                    }
                }
                did.clone()
            }
            None => {
                let did = did::derive_did(&verkey).map_err(|e| e.during("create_identity"))?;
                self.records
                    .add_own(scope, &DidRecord::new(did.clone(), key_pair))
                    .await
                    .map_err(|e| e.during("create_identity"))?;
                did
            }
        };

        log::info!("created did {did} in scope {scope}");
        Ok((did, verkey))
    }

    /// Stage a new key pair for `did` and return its verkey.
    ///
    /// The active key keeps resolving and signing until
    /// [`commit_rotation`](Self::commit_rotation). Calling this again before
    /// committing replaces the staged pair.
    pub async fn begin_rotation(
        &self,
        scope: &Scope,
        did: &str,
        request: &RotationRequest,
    ) -> Result<String> {
        let spec = request
            .key_spec()
            .map_err(|e| e.during("begin_rotation"))?;
        let key_pair = self
            .crypto
            .generate_keypair(spec.seed.as_ref(), spec.crypto_type)
            .map_err(|e| e.during("begin_rotation"))?;

        let temp_verkey = self
            .records
            .modify_own(scope, did, |record| {
                Ok(record.begin_rotation(key_pair).to_string())
            })
            .await
            .map_err(|e| e.during("begin_rotation"))?;

        log::info!("started key rotation for did {did}, pending verkey {temp_verkey}");
        Ok(temp_verkey)
    }

    /// Make the staged key pair active.
    ///
    /// # Errors
    ///
    /// `WalletItemNotFound` if the DID is unknown or no rotation is pending.
    pub async fn commit_rotation(&self, scope: &Scope, did: &str) -> Result<()> {
        let verkey = self
            .records
            .modify_own(scope, did, |record| {
                record.commit_rotation()?;
                Ok(record.verkey.clone())
            })
            .await
            .map_err(|e| e.during("commit_rotation"))?;

        log::info!("committed key rotation for did {did}, active verkey {verkey}");
        Ok(())
    }

    /// Discard the staged key pair, keeping the active one.
    pub async fn abort_rotation(&self, scope: &Scope, did: &str) -> Result<()> {
        self.records
            .modify_own(scope, did, DidRecord::abort_rotation)
            .await
            .map_err(|e| e.during("abort_rotation"))?;

        log::info!("aborted key rotation for did {did}");
        Ok(())
    }

    /// Public view of an own DID, joined with its metadata.
    pub async fn get_own_identity(&self, scope: &Scope, did: &str) -> Result<OwnIdentity> {
        let record = self
            .records
            .require_own(scope, did)
            .await
            .map_err(|e| e.during("get_own_identity"))?;
        let metadata = self
            .records
            .metadata(scope, did)
            .await
            .map_err(|e| e.during("get_own_identity"))?;
        Ok(OwnIdentity::from_record(&record, metadata))
    }

    /// All own DIDs of a scope.
    pub async fn list_own_identities(&self, scope: &Scope) -> Result<Vec<OwnIdentity>> {
        let records = self
            .records
            .list_own(scope)
            .await
            .map_err(|e| e.during("list_own_identities"))?;
        let mut identities = Vec::with_capacity(records.len());
        for record in &records {
            let metadata = self
                .records
                .metadata(scope, &record.did)
                .await
                .map_err(|e| e.during("list_own_identities"))?;
            identities.push(OwnIdentity::from_record(record, metadata));
        }
        log::debug!("listed {} own dids in scope {scope}", identities.len());
        Ok(identities)
    }

    /// Sign `message` with the active key of `did`.
    pub async fn sign(&self, scope: &Scope, did: &str, message: &[u8]) -> Result<Vec<u8>> {
        let record = self
            .records
            .require_own(scope, did)
            .await
            .map_err(|e| e.during("sign"))?;
        self.crypto
            .sign(&record.signkey, record.crypto_type, message)
            .map_err(|e| e.during("sign"))
    }

    /// Verify a signature against a full verkey.
    ///
    /// # Errors
    ///
    /// `SignatureInvalid` if the signature does not match, `InvalidKey` if
    /// the verkey or signature is malformed.
    pub fn verify(&self, verkey: &str, message: &[u8], signature: &[u8]) -> Result<()> {
        self.crypto
            .verify(verkey, message, signature)
            .map_err(|e| e.during("verify"))
    }
}
