//! Capability interfaces consumed by the ledger.
//!
//! - [`SignatureVerifier`]: authorization check for spending an output
//!   ([`Ed25519Verifier`](crate::crypto::Ed25519Verifier) implements)

use crate::types::OwnerKey;

/// Pure signature verification capability.
///
/// Returns `true` only if `signature` is a valid signature by `public_key`
/// over `message`. Malformed keys or signatures must verify as `false`
/// rather than panic.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, public_key: &OwnerKey, message: &[u8], signature: &[u8]) -> bool;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn verify(&self, public_key: &OwnerKey, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(public_key, message, signature)
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for std::sync::Arc<T> {
    fn verify(&self, public_key: &OwnerKey, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(public_key, message, signature)
    }
}
