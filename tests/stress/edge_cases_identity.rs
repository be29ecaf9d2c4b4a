//! Edge case tests: seed formats, qualified DIDs, cryptonyms, abbreviation,
//! rotation misuse, registry outages, and malformed registry answers.

use std::sync::Arc;

use did_wallet::did;
use did_wallet::{
    DidWallet, Endpoint, ErrorKind, IdentityRequest, MemoryKeyStore, MemoryRegistry, NoRegistry,
    PeerIdentityRequest, RotationRequest, Scope,
};

const TRUSTEE_SEED: &str = "000000000000000000000000Trustee1";
const TRUSTEE_DID: &str = "V4SGRU86Z58d6TV7PBUe6f";
const TRUSTEE_VERKEY: &str = "GJ1SzoWzavQYfNL9XkaJdrQejfztN4XqdsiV4ct3LXKL";
const TRUSTEE_ABBREV: &str = "~CoRER63DVYnWZtK8uAzNbx";

fn scope() -> Scope {
    Scope::new("edge")
}

// === Seed Edge Cases ===

#[tokio::test]
async fn edge_seed_formats_are_equivalent() {
    let raw = TRUSTEE_SEED;
    let hex_seed = hex::encode(raw.as_bytes());
    let b64_seed = "MDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwVHJ1c3RlZTE=";

    for seed in [raw.to_string(), hex_seed, b64_seed.to_string()] {
        let wallet = DidWallet::in_memory();
        let (did, verkey) = wallet
            .create_identity(&scope(), &IdentityRequest::new().with_seed(seed.as_str()))
            .await
            .unwrap_or_else(|e| panic!("seed {seed} should be accepted: {e}"));
        assert_eq!(did, TRUSTEE_DID);
        assert_eq!(verkey, TRUSTEE_VERKEY);
    }
}

#[tokio::test]
async fn edge_bad_seed_lengths_rejected() {
    let wallet = DidWallet::in_memory();
    for seed in ["", "0000000000000000000000000000001", "000000000000000000000000000000001"] {
        let err = wallet
            .create_identity(&scope(), &IdentityRequest::new().with_seed(seed))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStructure, "seed {seed:?}");
    }
}

// === DID Edge Cases ===

#[tokio::test]
async fn edge_qualified_did_is_accepted() {
    let wallet = DidWallet::in_memory();
    let qualified = format!("did:sov:{TRUSTEE_DID}");
    let (did, verkey) = wallet
        .create_identity(
            &scope(),
            &IdentityRequest::new()
                .with_did(qualified.as_str())
                .with_seed(TRUSTEE_SEED),
        )
        .await
        .unwrap();
    assert_eq!(did, qualified);
    assert_eq!(verkey, TRUSTEE_VERKEY);
    assert_eq!(
        wallet.resolve_key(&scope(), &qualified, false).await.unwrap(),
        TRUSTEE_VERKEY
    );
}

#[test]
fn edge_abbreviation_roundtrip() {
    let abbrev = did::abbreviate_verkey(TRUSTEE_DID, TRUSTEE_VERKEY).unwrap();
    assert_eq!(abbrev, TRUSTEE_ABBREV);
    assert_eq!(
        did::expand_verkey(TRUSTEE_DID, Some(&abbrev)).unwrap(),
        TRUSTEE_VERKEY
    );
}

#[test]
fn edge_unrelated_verkey_is_not_abbreviated() {
    let other = "2y6oVqbnTeZ4tv6WUY7FMHhY6SouNixyeWKHPgFDCsY8";
    assert_eq!(did::abbreviate_verkey(TRUSTEE_DID, other).unwrap(), other);
}

#[tokio::test]
async fn edge_cryptonym_peer_verkey_is_did() {
    let wallet = DidWallet::in_memory();
    wallet
        .store_peer_identity(&scope(), &PeerIdentityRequest::new(TRUSTEE_VERKEY))
        .await
        .unwrap();
    let peer = wallet.get_peer_identity(&scope(), TRUSTEE_VERKEY).await.unwrap();
    assert_eq!(peer.did, peer.verkey);
}

// === Rotation Edge Cases ===

#[tokio::test]
async fn edge_double_commit_fails() {
    let wallet = DidWallet::in_memory();
    let (did, _) = wallet
        .create_identity(&scope(), &IdentityRequest::new())
        .await
        .unwrap();
    wallet
        .begin_rotation(&scope(), &did, &RotationRequest::new())
        .await
        .unwrap();
    wallet.commit_rotation(&scope(), &did).await.unwrap();
    let err = wallet.commit_rotation(&scope(), &did).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WalletItemNotFound);
}

#[tokio::test]
async fn edge_rotation_to_same_seed_is_allowed() {
    let wallet = DidWallet::in_memory();
    let (did, verkey) = wallet
        .create_identity(&scope(), &IdentityRequest::new().with_seed(TRUSTEE_SEED))
        .await
        .unwrap();
    let temp = wallet
        .begin_rotation(&scope(), &did, &RotationRequest::new().with_seed(TRUSTEE_SEED))
        .await
        .unwrap();
    assert_eq!(temp, verkey);
    wallet.commit_rotation(&scope(), &did).await.unwrap();
    assert_eq!(wallet.resolve_key(&scope(), &did, false).await.unwrap(), verkey);
}

#[tokio::test]
async fn edge_rotation_is_scoped() {
    let wallet = DidWallet::in_memory();
    let (did, _) = wallet
        .create_identity(&scope(), &IdentityRequest::new())
        .await
        .unwrap();
    let err = wallet
        .begin_rotation(&Scope::new("someone-else"), &did, &RotationRequest::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WalletItemNotFound);
}

// === Registry Edge Cases ===

#[tokio::test]
async fn edge_registry_outage_keeps_local_reads_working() {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    wallet
        .store_peer_identity(
            &scope(),
            &PeerIdentityRequest::new(TRUSTEE_DID).with_verkey(TRUSTEE_ABBREV),
        )
        .await
        .unwrap();
    registry.set_offline(true);

    assert_eq!(
        wallet
            .resolve_key(&scope(), TRUSTEE_DID, true)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::RegistryUnavailable
    );
    assert_eq!(
        wallet.resolve_key(&scope(), TRUSTEE_DID, false).await.unwrap(),
        TRUSTEE_VERKEY
    );
}

#[tokio::test]
async fn edge_malformed_registry_answer_is_rejected() {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    registry.publish_verkey(TRUSTEE_DID, "garbage!").await;

    let err = wallet
        .resolve_key(&scope(), TRUSTEE_DID, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStructure);
    assert!(wallet.get_peer_identity(&scope(), TRUSTEE_DID).await.is_err());
}

#[tokio::test]
async fn edge_malformed_registry_endpoint_is_rejected() {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    registry
        .publish_endpoint(
            TRUSTEE_DID,
            Endpoint {
                address: String::new(),
                transport_verkey: "garbage!!".to_string(),
            },
        )
        .await;

    let err = wallet
        .get_endpoint(&scope(), TRUSTEE_DID, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStructure);
    assert!(wallet.get_endpoint(&scope(), TRUSTEE_DID, false).await.is_err());
}

#[tokio::test]
async fn edge_registry_abbreviation_on_cryptonym_is_rejected() {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    registry.publish_verkey(TRUSTEE_VERKEY, TRUSTEE_ABBREV).await;

    let err = wallet
        .resolve_key(&scope(), TRUSTEE_VERKEY, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStructure);
    assert!(wallet.get_peer_identity(&scope(), TRUSTEE_VERKEY).await.is_err());
}

#[tokio::test]
async fn edge_no_registry_fresh_endpoint_fails() {
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), Arc::new(NoRegistry));
    let err = wallet
        .get_endpoint(&scope(), TRUSTEE_DID, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistryUnavailable);
}
