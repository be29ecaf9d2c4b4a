//! DID derivation, validation, and verkey abbreviation.
//!
//! A derived DID is the base58 encoding of the first 16 bytes of the
//! verkey. Because of that relationship a verkey may be published in
//! abbreviated form, `~` followed by the base58 of its last 16 bytes, and
//! expanded again against the DID.
//!
//! Fully qualified DIDs (`did:<method>:<id>`) are accepted everywhere a DID
//! is; validation and derivation operate on the method-specific `<id>`.

use crate::crypto::CryptoType;
use crate::error::{IdentityError, Result};

const ABBREVIATION_PREFIX: char = '~';
const DID_PREFIX: &str = "did:";

/// Strip a `did:<method>:` qualifier, if present.
pub fn unqualify(did: &str) -> &str {
    match did.strip_prefix(DID_PREFIX) {
        Some(rest) => rest.split_once(':').map_or(did, |(_, id)| id),
        None => did,
    }
}

/// Derive a DID from a full verkey: base58 of its first 16 bytes.
pub fn derive_did(verkey: &str) -> Result<String> {
    let (key, _) = split_crypto_type(verkey)?;
    let bytes = decode_base58(key, "verkey")?;
    if bytes.len() != 32 {
        return Err(IdentityError::InvalidStructure(format!(
            "verkey must decode to 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bs58::encode(&bytes[..16]).into_string())
}

/// Check that a DID is base58 of 16 bytes (derived) or 32 bytes (cryptonym).
pub fn validate_did(did: &str) -> Result<()> {
    let id = unqualify(did);
    let bytes = decode_base58(id, "did")?;
    match bytes.len() {
        16 | 32 => Ok(()),
        n => Err(IdentityError::InvalidStructure(format!(
            "did must decode to 16 or 32 bytes, got {n}: {did}"
        ))),
    }
}

/// Check that a verkey is well formed: full (32 bytes) or abbreviated
/// (`~` + 16 bytes), with an optional `:<crypto_type>` suffix.
pub fn validate_verkey(verkey: &str) -> Result<()> {
    let (key, _) = split_crypto_type(verkey)?;
    let (key, expected) = match key.strip_prefix(ABBREVIATION_PREFIX) {
        Some(rest) => (rest, 16),
        None => (key, 32),
    };
    let bytes = decode_base58(key, "verkey")?;
    if bytes.len() != expected {
        return Err(IdentityError::InvalidStructure(format!(
            "verkey must decode to {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

/// Return `true` if the verkey is in abbreviated `~` form.
pub fn is_abbreviated(verkey: &str) -> bool {
    verkey.starts_with(ABBREVIATION_PREFIX)
}

/// Produce the full verkey for a DID.
///
/// - `None` yields the DID itself (a cryptonym: the DID *is* the verkey).
/// - `~abbrev` is expanded by prefixing the DID's decoded bytes. Only a
///   16-byte DID can carry an abbreviated verkey.
/// - A full verkey is returned unchanged.
///
/// Any `:<crypto_type>` suffix is preserved.
pub fn expand_verkey(did: &str, verkey: Option<&str>) -> Result<String> {
    let Some(verkey) = verkey else {
        return Ok(unqualify(did).to_string());
    };

    let (key, crypto_type) = split_crypto_type(verkey)?;
    let key = match key.strip_prefix(ABBREVIATION_PREFIX) {
        Some(rest) => {
            let mut bytes = decode_base58(unqualify(did), "did")?;
            if bytes.len() != 16 {
                return Err(IdentityError::InvalidStructure(format!(
                    "abbreviated verkey needs a 16-byte did, {did} decodes to {} bytes",
                    bytes.len()
                )));
            }
            bytes.extend(decode_base58(rest, "verkey")?);
            bs58::encode(bytes).into_string()
        }
        None => key.to_string(),
    };

    Ok(match crypto_type {
        Some(crypto_type) => format!("{key}:{crypto_type}"),
        None => key,
    })
}

/// Expand `verkey` against `did` and check that the result is a usable
/// 32-byte key. This is the form every stored peer verkey takes.
pub fn full_verkey(did: &str, verkey: Option<&str>) -> Result<String> {
    if let Some(verkey) = verkey {
        validate_verkey(verkey)?;
    }
    let full = expand_verkey(did, verkey)?;
    validate_verkey(&full)?;
    Ok(full)
}

/// Abbreviate a full verkey against its DID when possible.
///
/// Returns `~` + base58 of the last 16 bytes if the first 16 bytes of the
/// verkey are the DID; otherwise the full verkey is returned unchanged.
pub fn abbreviate_verkey(did: &str, verkey: &str) -> Result<String> {
    validate_did(did)?;
    validate_verkey(verkey)?;
    if is_abbreviated(verkey) {
        return Err(IdentityError::InvalidStructure(
            "verkey is already abbreviated".into(),
        ));
    }

    let (key, _) = split_crypto_type(verkey)?;
    let did_bytes = decode_base58(unqualify(did), "did")?;
    let key_bytes = decode_base58(key, "verkey")?;

    if did_bytes.len() == 16 && key_bytes[..16] == did_bytes[..] {
        Ok(format!(
            "{ABBREVIATION_PREFIX}{}",
            bs58::encode(&key_bytes[16..]).into_string()
        ))
    } else {
        Ok(verkey.to_string())
    }
}

fn split_crypto_type(verkey: &str) -> Result<(&str, Option<CryptoType>)> {
    match verkey.split_once(':') {
        Some((key, crypto_type)) => Ok((key, Some(crypto_type.parse()?))),
        None => Ok((verkey, None)),
    }
}

fn decode_base58(text: &str, what: &str) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(IdentityError::InvalidStructure(format!("{what} is empty")));
    }
    bs58::decode(text)
        .into_vec()
        .map_err(|e| IdentityError::InvalidStructure(format!("{what} is not base58: {e}")))
}
