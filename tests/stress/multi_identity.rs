//! Stress test: create 100 identities in one scope, verify all have unique
//! DIDs, all can sign and verify, and all survive a rotation cycle.

use std::collections::HashSet;

use did_wallet::{DidWallet, IdentityRequest, RotationRequest, Scope};

#[tokio::test]
async fn stress_100_unique_identities() {
    let wallet = DidWallet::in_memory();
    let scope = Scope::new("stress");
    let mut dids = HashSet::new();

    for _ in 0..100 {
        let (did, _) = wallet
            .create_identity(&scope, &IdentityRequest::new())
            .await
            .expect("create should succeed");
        assert!(dids.insert(did.clone()), "Duplicate DID found: {did}");
    }

    assert_eq!(dids.len(), 100);
    assert_eq!(wallet.list_own_identities(&scope).await.unwrap().len(), 100);
}

#[tokio::test]
async fn stress_100_identities_sign_and_verify() {
    let wallet = DidWallet::in_memory();
    let scope = Scope::new("stress");

    for i in 0..100 {
        let (did, verkey) = wallet
            .create_identity(&scope, &IdentityRequest::new())
            .await
            .unwrap();
        let message = format!("message from identity {i}");
        let signature = wallet
            .sign(&scope, &did, message.as_bytes())
            .await
            .expect("signing should succeed");
        wallet
            .verify(&verkey, message.as_bytes(), &signature)
            .unwrap_or_else(|e| panic!("signature of identity {i} should verify: {e}"));
    }
}

#[tokio::test]
async fn stress_100_seeded_identities_are_reproducible() {
    let first = DidWallet::in_memory();
    let second = DidWallet::in_memory();
    let scope = Scope::new("stress");

    for i in 0..100u32 {
        let seed = format!("{i:0>32}");
        let request = IdentityRequest::new().with_seed(seed.as_str());
        let a = first.create_identity(&scope, &request).await.unwrap();
        let b = second.create_identity(&scope, &request).await.unwrap();
        assert_eq!(a, b, "seed {seed} should give the same identity");
    }
}

#[tokio::test]
async fn stress_rotate_every_identity() {
    let wallet = DidWallet::in_memory();
    let scope = Scope::new("stress");
    let mut identities = Vec::new();
    for _ in 0..50 {
        identities.push(
            wallet
                .create_identity(&scope, &IdentityRequest::new())
                .await
                .unwrap(),
        );
    }

    let mut pending = Vec::new();
    for (did, _) in &identities {
        pending.push(
            wallet
                .begin_rotation(&scope, did, &RotationRequest::new())
                .await
                .unwrap(),
        );
    }
    for (did, old) in &identities {
        assert_eq!(&wallet.resolve_key(&scope, did, false).await.unwrap(), old);
    }

    for (did, _) in &identities {
        wallet.commit_rotation(&scope, did).await.unwrap();
    }
    for ((did, _), new) in identities.iter().zip(&pending) {
        assert_eq!(&wallet.resolve_key(&scope, did, false).await.unwrap(), new);
    }
}
