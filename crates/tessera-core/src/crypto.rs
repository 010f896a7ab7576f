//! Ed25519 key handling, per-input signing, and signature verification.
//!
//! # Signing scheme
//!
//! Each input is signed over a **sighash** that commits to:
//! - Transaction version and nonce
//! - All input outpoints (txid + index)
//! - All outputs (value + owner)
//! - The index of the input being signed
//!
//! Signatures are excluded from the sighash, so inputs can be signed in any
//! order, and the index commitment stops a signature for input *i* from
//! being replayed as input *j*.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;

use crate::error::CryptoError;
use crate::traits::SignatureVerifier;
use crate::types::{Hash256, OwnerKey, Transaction};

/// Spending key for outputs owned by [`KeyPair::owner_key`].
#[derive(Clone)]
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Deterministic key from a 32-byte seed.
    pub fn from_secret_bytes(seed: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Key to put in [`TxOutput::owner`](crate::types::TxOutput::owner) to pay this holder.
    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("owner", &self.owner_key())
            .finish_non_exhaustive()
    }
}

/// Decoded verifying key of an output owner.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Decode an owner key. Fails on bytes that are not a curve point.
    pub fn from_owner(owner: &OwnerKey) -> Result<Self, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(owner.as_bytes())
            .map(|verifying_key| Self { verifying_key })
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    pub fn to_owner(&self) -> OwnerKey {
        OwnerKey(self.verifying_key.to_bytes())
    }

    /// `true` iff `signature` is valid for `message` under this key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        self.verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_owner())
    }
}

/// [`SignatureVerifier`] backed by ed25519-dalek.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, public_key: &OwnerKey, message: &[u8], signature: &[u8]) -> bool {
        let Ok(pk) = PublicKey::from_owner(public_key) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        pk.verify(message, &sig_bytes)
    }
}

/// Compute the signing hash (sighash) for a transaction input.
pub fn signing_hash(tx: &Transaction, input_index: usize) -> Result<Hash256, CryptoError> {
    if input_index >= tx.inputs.len() {
        return Err(CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len: tx.inputs.len(),
        });
    }

    let mut data = Vec::new();

    data.extend_from_slice(&tx.version.to_le_bytes());

    // All input outpoints (no signatures)
    data.extend_from_slice(&(tx.inputs.len() as u64).to_le_bytes());
    for input in &tx.inputs {
        data.extend_from_slice(input.previous_output.txid.as_bytes());
        data.extend_from_slice(&input.previous_output.index.to_le_bytes());
    }

    data.extend_from_slice(&(tx.outputs.len() as u64).to_le_bytes());
    for output in &tx.outputs {
        data.extend_from_slice(&output.value.to_le_bytes());
        data.extend_from_slice(output.owner.as_bytes());
    }

    data.extend_from_slice(&tx.nonce.to_le_bytes());
    data.extend_from_slice(&(input_index as u64).to_le_bytes());

    Ok(Hash256(blake3::hash(&data).into()))
}

/// Sign a transaction input in place.
pub fn sign_transaction_input(
    tx: &mut Transaction,
    input_index: usize,
    keypair: &KeyPair,
) -> Result<(), CryptoError> {
    let sighash = signing_hash(tx, input_index)?;
    tx.inputs[input_index].signature = keypair.sign(sighash.as_bytes()).to_vec();
    Ok(())
}

/// Verify one input's signature against the owner of the output it spends.
pub fn verify_transaction_input<V: SignatureVerifier + ?Sized>(
    verifier: &V,
    tx: &Transaction,
    input_index: usize,
    owner: &OwnerKey,
) -> bool {
    match signing_hash(tx, input_index) {
        Ok(sighash) => verifier.verify(
            owner,
            sighash.as_bytes(),
            &tx.inputs[input_index].signature,
        ),
        Err(_) => false,
    }
}
