//! Per-DID service endpoints.

use crate::did;
use crate::error::{IdentityError, Result};
use crate::identity::{Endpoint, EndpointRecord};
use crate::resolve::{self, Cached, Freshness, Resolution};
use crate::storage::Scope;
use crate::time::now_micros;

use super::DidWallet;

impl DidWallet {
    /// Store the endpoint of `did`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `InvalidStructure` for a malformed DID or transport verkey, or an
    /// empty address.
    pub async fn set_endpoint(
        &self,
        scope: &Scope,
        did: &str,
        address: &str,
        transport_verkey: &str,
    ) -> Result<()> {
        did::validate_did(did).map_err(|e| e.during("set_endpoint"))?;
        did::validate_verkey(transport_verkey).map_err(|e| e.during("set_endpoint"))?;
        validate_address(address).map_err(|e| e.during("set_endpoint"))?;

        let endpoint = Endpoint {
            address: address.to_string(),
            transport_verkey: transport_verkey.to_string(),
        };
        self.records
            .put_endpoint(scope, &EndpointRecord::new(did.to_string(), endpoint))
            .await
            .map_err(|e| e.during("set_endpoint"))?;
        log::debug!("stored endpoint {address} for {did}");
        Ok(())
    }

    /// Endpoint of `did`, from local storage or (`fresh == true`) the
    /// registry.
    pub async fn get_endpoint(&self, scope: &Scope, did: &str, fresh: bool) -> Result<Endpoint> {
        Ok(self.resolve_endpoint(scope, did, fresh.into()).await?.value)
    }

    /// Resolve the endpoint of `did` under an explicit [`Freshness`] policy.
    ///
    /// A registry endpoint that is missing or different locally is cached.
    /// Registry answers are checked like [`set_endpoint`](Self::set_endpoint)
    /// input, with the transport verkey expanded against `did`; a malformed
    /// answer fails with `InvalidStructure` and nothing is cached.
    pub async fn resolve_endpoint(
        &self,
        scope: &Scope,
        did: &str,
        freshness: Freshness,
    ) -> Result<Resolution<Endpoint>> {
        did::validate_did(did).map_err(|e| e.during("get_endpoint"))?;

        let now = now_micros();
        let local = self
            .records
            .endpoint(scope, did)
            .await
            .map_err(|e| e.during("get_endpoint"))?
            .map(|r| Cached::new(r.endpoint, r.updated_at));

        if !freshness.needs_refresh(local.as_ref(), now) {
            return local
                .map(|cached| cached.into_resolution(did))
                .ok_or_else(|| IdentityError::WalletItemNotFound(format!("endpoint of {did}")));
        }

        let remote = self
            .registry
            .resolve_endpoint(did)
            .await
            .map_err(|e| e.during("get_endpoint"))?
            .map(|endpoint| checked_registry_endpoint(did, endpoint))
            .transpose()
            .map_err(|e| e.during("get_endpoint"))?;
        let reconciled = resolve::reconcile(did, local, remote, now)
            .map_err(|e| e.during("get_endpoint"))?;
        if reconciled.needs_write_back() {
            if reconciled.changed {
                log::info!(
                    "cached endpoint of {did} updated from registry to {}",
                    reconciled.resolution.value.address
                );
            }
            let mut record =
                EndpointRecord::new(did.to_string(), reconciled.resolution.value.clone());
            record.updated_at = reconciled.resolution.observed_at;
            self.records
                .put_endpoint(scope, &record)
                .await
                .map_err(|e| e.during("get_endpoint"))?;
        }
        Ok(reconciled.resolution)
    }
}

fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(IdentityError::InvalidStructure(
            "address must not be empty".into(),
        ));
    }
    Ok(())
}

fn checked_registry_endpoint(did: &str, endpoint: Endpoint) -> Result<Endpoint> {
    validate_address(&endpoint.address)?;
    Ok(Endpoint {
        transport_verkey: did::full_verkey(did, Some(&endpoint.transport_verkey))?,
        address: endpoint.address,
    })
}
