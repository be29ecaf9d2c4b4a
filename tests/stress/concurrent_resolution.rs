//! Stress test: many tasks resolve, store, and rotate concurrently against
//! one wallet. Every write is last-write-wins, so the only requirement is
//! that all operations complete and the final state is one of the written
//! values.

use std::sync::Arc;

use did_wallet::{
    DidWallet, Freshness, IdentityRequest, MemoryKeyStore, MemoryRegistry, PeerIdentityRequest,
    RotationRequest, Scope, Source,
};

const PEER_DID: &str = "JDmZmbYJnRyz5mb5U9wCxK";
const PEER_VERKEY: &str = "APN393PJb55Jyi94DtgkQPd9zxghPbFSPqheppei5Esf";
const OTHER_VERKEY: &str = "2y6oVqbnTeZ4tv6WUY7FMHhY6SouNixyeWKHPgFDCsY8";

fn wallet() -> (DidWallet, Arc<MemoryRegistry>) {
    let registry = Arc::new(MemoryRegistry::new());
    let wallet = DidWallet::new(Arc::new(MemoryKeyStore::new()), registry.clone());
    (wallet, registry)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_fresh_resolutions_agree() {
    let (wallet, registry) = wallet();
    let scope = Scope::new("stress");
    wallet
        .store_peer_identity(
            &scope,
            &PeerIdentityRequest::new(PEER_DID).with_verkey(OTHER_VERKEY),
        )
        .await
        .unwrap();
    registry.publish_verkey(PEER_DID, PEER_VERKEY).await;

    let mut handles = Vec::new();
    for _ in 0..64 {
        let wallet = wallet.clone();
        let scope = scope.clone();
        handles.push(tokio::spawn(async move {
            wallet.resolve(&scope, PEER_DID, Freshness::Fresh).await
        }));
    }

    for handle in handles {
        let resolution = handle.await.unwrap().expect("fresh resolution should succeed");
        assert_eq!(resolution.value, PEER_VERKEY);
        assert_eq!(resolution.source, Source::Authoritative);
    }
    assert_eq!(registry.lookups(), 64);
    assert_eq!(
        wallet.resolve_key(&scope, PEER_DID, false).await.unwrap(),
        PEER_VERKEY
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_peer_writes_last_write_wins() {
    let (wallet, _registry) = wallet();
    let scope = Scope::new("stress");

    let mut handles = Vec::new();
    for i in 0..100 {
        let wallet = wallet.clone();
        let scope = scope.clone();
        let verkey = if i % 2 == 0 { PEER_VERKEY } else { OTHER_VERKEY };
        handles.push(tokio::spawn(async move {
            wallet
                .store_peer_identity(
                    &scope,
                    &PeerIdentityRequest::new(PEER_DID).with_verkey(verkey),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let verkey = wallet.resolve_key(&scope, PEER_DID, false).await.unwrap();
    assert!(verkey == PEER_VERKEY || verkey == OTHER_VERKEY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_resolution_during_rotation_never_sees_pending_key() {
    let (wallet, _registry) = wallet();
    let scope = Scope::new("stress");
    let (did, verkey) = wallet
        .create_identity(&scope, &IdentityRequest::new())
        .await
        .unwrap();

    let rotator = {
        let wallet = wallet.clone();
        let scope = scope.clone();
        let did = did.clone();
        tokio::spawn(async move {
            let mut staged = Vec::new();
            for _ in 0..20 {
                staged.push(
                    wallet
                        .begin_rotation(&scope, &did, &RotationRequest::new())
                        .await
                        .unwrap(),
                );
            }
            staged
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let wallet = wallet.clone();
        let scope = scope.clone();
        let did = did.clone();
        readers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..50 {
                seen.push(wallet.resolve_key(&scope, &did, false).await.unwrap());
            }
            seen
        }));
    }

    let staged = rotator.await.unwrap();
    for reader in readers {
        for seen in reader.await.unwrap() {
            assert_eq!(seen, verkey, "a pending key must never resolve");
        }
    }

    wallet.commit_rotation(&scope, &did).await.unwrap();
    let active = wallet.resolve_key(&scope, &did, false).await.unwrap();
    assert_eq!(Some(&active), staged.last());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_scopes_are_independent_under_load() {
    let (wallet, _registry) = wallet();

    let mut handles = Vec::new();
    for i in 0..32 {
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            let scope = Scope::new(format!("tenant-{i}"));
            let (did, _) = wallet
                .create_identity(&scope, &IdentityRequest::new())
                .await
                .unwrap();
            wallet
                .set_metadata(&scope, &did, &format!("owner {i}"))
                .await
                .unwrap();
            (scope, did)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (scope, did) = handle.await.unwrap();
        let identities = wallet.list_own_identities(&scope).await.unwrap();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].did, did);
        assert_eq!(
            identities[0].metadata.as_deref(),
            Some(format!("owner {i}").as_str())
        );
    }
}
