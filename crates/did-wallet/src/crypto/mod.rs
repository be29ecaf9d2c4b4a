//! Cryptographic primitives for did-wallet.
//!
//! This module provides:
//! - The [`keys::CryptoProvider`] seam and its Ed25519 implementation
//! - Seed parsing for deterministic key generation
//! - Store key derivation (Argon2id, then HKDF-SHA256 per purpose)
//! - ChaCha20-Poly1305 sealing of stored records

pub mod derivation;
pub mod encryption;
pub mod keys;
pub mod seed;

pub use keys::{CryptoProvider, CryptoType, Ed25519Provider, KeyPair, SignKey};
pub use seed::Seed;
