//! Freshness policy and reconciliation of locally cached values with the
//! authoritative registry.
//!
//! Key resolution and endpoint resolution share this logic. A caller looks
//! up its local [`Cached`] value, asks [`Freshness::needs_refresh`] whether
//! the registry must be consulted, and if so feeds the registry answer to
//! [`reconcile`]. Whenever the result is [`Source::Authoritative`] the
//! caller writes the value back to the local store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};

/// How current a resolved value must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Use only what is stored locally. Never contacts the registry.
    #[default]
    Local,
    /// Always consult the registry.
    Fresh,
    /// Consult the registry only if the local value is missing or older
    /// than the bound.
    MaxAge(Duration),
}

impl From<bool> for Freshness {
    fn from(fresh: bool) -> Self {
        if fresh {
            Self::Fresh
        } else {
            Self::Local
        }
    }
}

impl Freshness {
    /// Whether the registry must be consulted given the local value.
    pub fn needs_refresh<T>(&self, local: Option<&Cached<T>>, now: u64) -> bool {
        match self {
            Self::Local => false,
            Self::Fresh => true,
            Self::MaxAge(max_age) => match local {
                Some(cached) => crate::time::is_older_than(cached.observed_at, *max_age, now),
                None => true,
            },
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Local storage, possibly stale.
    Local,
    /// Confirmed by the registry during this call.
    Authoritative,
}

/// A locally stored value and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    pub value: T,
    pub observed_at: u64,
}

impl<T> Cached<T> {
    pub fn new(value: T, observed_at: u64) -> Self {
        Self { value, observed_at }
    }

    /// Turn the cached value into a local resolution.
    pub fn into_resolution(self, did: &str) -> Resolution<T> {
        Resolution {
            did: did.to_string(),
            value: self.value,
            source: Source::Local,
            observed_at: self.observed_at,
        }
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution<T> {
    pub did: String,
    pub value: T,
    pub source: Source,
    /// Unix-epoch microseconds at which `value` was stored or confirmed.
    pub observed_at: u64,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
    pub resolution: Resolution<T>,
    /// `true` when the registry value differs from (or replaces a missing)
    /// local value.
    pub changed: bool,
}

impl<T> Reconciled<T> {
    /// Whether the caller must write the value back locally.
    pub fn needs_write_back(&self) -> bool {
        self.resolution.source == Source::Authoritative
    }
}

/// Merge a registry answer with the local value.
///
/// The registry dominates whenever it has an answer. If it has none the local
/// value is returned unchanged; if neither side knows the DID the call fails
/// with `WalletItemNotFound`.
pub fn reconcile<T: PartialEq>(
    did: &str,
    local: Option<Cached<T>>,
    remote: Option<T>,
    now: u64,
) -> Result<Reconciled<T>> {
    match (remote, local) {
        (Some(value), local) => {
            let changed = local.map_or(true, |cached| cached.value != value);
            Ok(Reconciled {
                resolution: Resolution {
                    did: did.to_string(),
                    value,
                    source: Source::Authoritative,
                    observed_at: now,
                },
                changed,
            })
        }
        (None, Some(cached)) => Ok(Reconciled {
            resolution: cached.into_resolution(did),
            changed: false,
        }),
        (None, None) => Err(IdentityError::WalletItemNotFound(format!(
            "did {did} is unknown locally and not published"
        ))),
    }
}
