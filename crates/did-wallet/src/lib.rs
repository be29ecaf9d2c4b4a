//! did-wallet — key lifecycle and resolution for Decentralized Identifiers.
//!
//! Creates Ed25519 key pairs bound to DIDs, rotates them with a two-phase
//! begin/commit protocol, keeps pairwise peer DIDs, and resolves a DID to
//! its current verkey either from local storage or reconciled with an
//! authoritative registry. Per-DID endpoints and metadata round it off.
//!
//! ```no_run
//! # async fn demo() -> did_wallet::Result<()> {
//! use did_wallet::{DidWallet, IdentityRequest, RotationRequest, Scope};
//!
//! let wallet = DidWallet::in_memory();
//! let scope = Scope::new("alice");
//!
//! let (did, verkey) = wallet
//!     .create_identity(&scope, &IdentityRequest::new())
//!     .await?;
//! let pending = wallet
//!     .begin_rotation(&scope, &did, &RotationRequest::new())
//!     .await?;
//! assert_eq!(wallet.resolve_key(&scope, &did, false).await?, verkey);
//!
//! wallet.commit_rotation(&scope, &did).await?;
//! assert_eq!(wallet.resolve_key(&scope, &did, false).await?, pending);
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod did;
pub mod error;
pub mod identity;
pub mod registry;
pub mod resolve;
pub mod storage;
pub mod time;
pub mod wallet;

// Re-export primary types
pub use crypto::{CryptoProvider, CryptoType, Ed25519Provider, KeyPair, Seed, SignKey};
pub use error::{ErrorKind, IdentityError, Result};
pub use identity::{
    DidRecord, Endpoint, IdentityRequest, OwnIdentity, PairwiseDidRecord, PeerIdentityRequest,
    RotationRequest, RotationState,
};
pub use registry::{MemoryRegistry, NoRegistry, Registry};
pub use resolve::{Freshness, Resolution, Source};
pub use storage::{FileKeyStore, KeyStore, MemoryKeyStore, RecordKind, Scope};
pub use wallet::DidWallet;
