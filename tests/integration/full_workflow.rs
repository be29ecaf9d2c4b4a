//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Create an identity from a fixed seed
//! 2. Stage a rotation and confirm the old key stays active
//! 3. Commit the rotation
//! 4. Exchange pairwise DIDs between two scopes
//! 5. Resolve through the registry and cache the answer
//! 6. Attach metadata and endpoints

use std::sync::Arc;

use did_wallet::{
    DidWallet, Endpoint, Freshness, IdentityRequest, MemoryKeyStore, MemoryRegistry,
    PeerIdentityRequest, RotationRequest, RotationState, Scope, Source,
};

const SEED: &str = "00000000000000000000000000000001";
const DID: &str = "4cLztgZYocjqTdAZM93t27";
const VERKEY: &str = "2y6oVqbnTeZ4tv6WUY7FMHhY6SouNixyeWKHPgFDCsY8";

fn wallet() -> (DidWallet, Arc<MemoryRegistry>) {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    (wallet, registry)
}

#[tokio::test]
async fn full_workflow_create_rotate_commit() {
    let (wallet, registry) = wallet();
    let scope = Scope::new("alice");

    // ── Step 1: Create identity ──────────────────────────────────────────
    let (did0, verkey0) = wallet
        .create_identity(&scope, &IdentityRequest::new().with_seed(SEED))
        .await
        .expect("create should succeed");
    assert_eq!(did0, DID);
    assert_eq!(verkey0, VERKEY);

    // ── Step 2: Begin rotation ───────────────────────────────────────────
    let verkey1 = wallet
        .begin_rotation(&scope, &did0, &RotationRequest::new())
        .await
        .expect("begin_rotation should succeed");
    assert_ne!(verkey1, verkey0);

    assert_eq!(
        wallet.resolve_key(&scope, &did0, false).await.unwrap(),
        verkey0,
        "pending rotation must not change the active key"
    );
    let record = wallet.records().require_own(&scope, &did0).await.unwrap();
    assert_eq!(record.state(), RotationState::RotationPending);

    let signature = wallet.sign(&scope, &did0, b"still me").await.unwrap();
    wallet
        .verify(&verkey0, b"still me", &signature)
        .expect("old key still signs while pending");

    // ── Step 3: Commit ───────────────────────────────────────────────────
    wallet.commit_rotation(&scope, &did0).await.unwrap();
    assert_eq!(
        wallet.resolve_key(&scope, &did0, false).await.unwrap(),
        verkey1
    );
    let identity = wallet.get_own_identity(&scope, &did0).await.unwrap();
    assert_eq!(identity.verkey, verkey1);
    assert!(identity.temp_verkey.is_none());

    // Nothing above consulted the registry.
    assert_eq!(registry.lookups(), 0);
}

#[tokio::test]
async fn full_workflow_pairwise_exchange() {
    let (wallet, registry) = wallet();
    let alice = Scope::new("alice");
    let bob = Scope::new("bob");

    let (alice_did, alice_verkey) = wallet
        .create_identity(&alice, &IdentityRequest::new())
        .await
        .unwrap();
    let (bob_did, bob_verkey) = wallet
        .create_identity(&bob, &IdentityRequest::new())
        .await
        .unwrap();

    // Each side stores the other's DID; Bob sends his verkey abbreviated.
    let bob_abbrev = did_wallet::did::abbreviate_verkey(&bob_did, &bob_verkey).unwrap();
    assert!(bob_abbrev.starts_with('~'));
    wallet
        .store_peer_identity(
            &alice,
            &PeerIdentityRequest::new(bob_did.as_str()).with_verkey(bob_abbrev),
        )
        .await
        .unwrap();
    wallet
        .store_peer_identity(
            &bob,
            &PeerIdentityRequest::new(alice_did.as_str()).with_verkey(alice_verkey.as_str()),
        )
        .await
        .unwrap();

    assert_eq!(
        wallet.resolve_key(&alice, &bob_did, false).await.unwrap(),
        bob_verkey
    );

    // Bob signs; Alice verifies with the key she resolved for him.
    let signature = wallet.sign(&bob, &bob_did, b"hello alice").await.unwrap();
    let resolved = wallet.resolve_key(&alice, &bob_did, false).await.unwrap();
    wallet.verify(&resolved, b"hello alice", &signature).unwrap();

    // Bob rotates and publishes; Alice's cache is stale until she asks fresh.
    let bob_new = wallet
        .begin_rotation(&bob, &bob_did, &RotationRequest::new())
        .await
        .unwrap();
    wallet.commit_rotation(&bob, &bob_did).await.unwrap();
    registry.publish_verkey(bob_did.as_str(), bob_new.as_str()).await;

    assert_eq!(
        wallet.resolve_key(&alice, &bob_did, false).await.unwrap(),
        bob_verkey
    );
    let fresh = wallet
        .resolve(&alice, &bob_did, Freshness::Fresh)
        .await
        .unwrap();
    assert_eq!(fresh.value, bob_new);
    assert_eq!(fresh.source, Source::Authoritative);
    assert_eq!(
        wallet.resolve_key(&alice, &bob_did, false).await.unwrap(),
        bob_new,
        "fresh resolution must update the cache"
    );
}

#[tokio::test]
async fn full_workflow_metadata_and_endpoints() {
    let (wallet, registry) = wallet();
    let scope = Scope::new("alice");
    let (did, verkey) = wallet
        .create_identity(&scope, &IdentityRequest::new().with_seed(SEED))
        .await
        .unwrap();

    assert_eq!(wallet.get_metadata(&scope, &did).await.unwrap(), None);
    wallet.set_metadata(&scope, &did, "A").await.unwrap();
    wallet.set_metadata(&scope, &did, "B").await.unwrap();
    assert_eq!(
        wallet.get_metadata(&scope, &did).await.unwrap().as_deref(),
        Some("B")
    );

    wallet
        .set_endpoint(&scope, &did, "127.0.0.1:9700", &verkey)
        .await
        .unwrap();
    assert_eq!(
        wallet.get_endpoint(&scope, &did, false).await.unwrap(),
        Endpoint {
            address: "127.0.0.1:9700".into(),
            transport_verkey: verkey.clone(),
        }
    );

    registry
        .publish_endpoint(
            did.as_str(),
            Endpoint {
                address: "10.1.1.1:9700".into(),
                transport_verkey: verkey.clone(),
            },
        )
        .await;
    assert_eq!(
        wallet.get_endpoint(&scope, &did, true).await.unwrap().address,
        "10.1.1.1:9700"
    );
    assert_eq!(
        wallet.get_endpoint(&scope, &did, false).await.unwrap().address,
        "10.1.1.1:9700"
    );

    let listed = wallet.list_own_identities(&scope).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].metadata.as_deref(), Some("B"));
}

#[tokio::test]
async fn full_workflow_request_json_shapes() {
    let (wallet, _registry) = wallet();
    let scope = Scope::new("json");

    let request =
        IdentityRequest::from_json(&format!(r#"{{"seed":"{SEED}","crypto_type":"ed25519"}}"#))
            .unwrap();
    let (did, _) = wallet.create_identity(&scope, &request).await.unwrap();
    assert_eq!(did, DID);

    let peer = PeerIdentityRequest::from_json(
        r#"{"did":"JDmZmbYJnRyz5mb5U9wCxK","verkey":"~4Z7Qnboe25QhrDsy1MqUUu"}"#,
    )
    .unwrap();
    wallet.store_peer_identity(&scope, &peer).await.unwrap();
    assert_eq!(
        wallet
            .resolve_key(&scope, "JDmZmbYJnRyz5mb5U9wCxK", false)
            .await
            .unwrap(),
        "APN393PJb55Jyi94DtgkQPd9zxghPbFSPqheppei5Esf"
    );

    let identity = wallet.get_own_identity(&scope, &did).await.unwrap();
    let json = serde_json::to_value(&identity).unwrap();
    assert_eq!(json["did"], DID);
    assert!(json.get("tempVerkey").is_none());
    assert!(json.get("signkey").is_none());
}
