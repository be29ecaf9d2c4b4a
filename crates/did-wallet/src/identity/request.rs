//! Configuration inputs for identity operations.
//!
//! Each request deserializes from the JSON shape accepted at the API
//! boundary, e.g. `{"did": "...", "seed": "...", "crypto_type": "ed25519"}`.
//! All fields are optional unless noted. Unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoType, Seed};
use crate::error::{IdentityError, Result};

/// Request for `create_identity`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRequest {
    /// Explicit DID. When absent the DID is derived from the verkey; when
    /// present and already stored, the keys are replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    /// Seed for deterministic key generation; random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// Signature algorithm; `ed25519` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_type: Option<String>,
}

impl IdentityRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a request from its JSON configuration form.
    pub fn from_json(json: &str) -> Result<Self> {
        parse_json(json, "identity request")
    }

    pub fn with_did(mut self, did: impl Into<String>) -> Self {
        self.did = Some(did.into());
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_crypto_type(mut self, crypto_type: impl Into<String>) -> Self {
        self.crypto_type = Some(crypto_type.into());
        self
    }

    /// Key-generation part of the request.
    pub fn key_spec(&self) -> Result<KeySpec> {
        KeySpec::parse(self.seed.as_deref(), self.crypto_type.as_deref())
    }
}

impl fmt::Debug for IdentityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRequest")
            .field("did", &self.did)
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .field("crypto_type", &self.crypto_type)
            .finish()
    }
}

/// Request for `begin_rotation`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_type: Option<String>,
}

impl RotationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        parse_json(json, "rotation request")
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn key_spec(&self) -> Result<KeySpec> {
        KeySpec::parse(self.seed.as_deref(), self.crypto_type.as_deref())
    }
}

impl fmt::Debug for RotationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationRequest")
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .field("crypto_type", &self.crypto_type)
            .finish()
    }
}

/// Request for `store_peer_identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentityRequest {
    /// The peer's DID (required).
    pub did: String,
    /// The peer's verkey, full or `~`-abbreviated. When absent the DID is
    /// taken to be a cryptonym and used as the verkey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verkey: Option<String>,
}

impl PeerIdentityRequest {
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            verkey: None,
        }
    }

    pub fn with_verkey(mut self, verkey: impl Into<String>) -> Self {
        self.verkey = Some(verkey.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        parse_json(json, "peer identity request")
    }
}

/// Validated key-generation parameters.
#[derive(Debug)]
pub struct KeySpec {
    pub seed: Option<Seed>,
    pub crypto_type: CryptoType,
}

impl KeySpec {
    fn parse(seed: Option<&str>, crypto_type: Option<&str>) -> Result<Self> {
        let crypto_type = crypto_type
            .map(str::parse::<CryptoType>)
            .transpose()?
            .unwrap_or_default();
        let seed = seed.map(Seed::parse).transpose()?;
        Ok(Self { seed, crypto_type })
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json)
        .map_err(|e| IdentityError::InvalidStructure(format!("malformed {what}: {e}")))
}
