//! Signer using the k256 Rust crate (implementation of ecdsa in Rust).

use super::{eth_signed_message_digest, recovery_id, Error};
use crate::abiencode::types::{Address, Hash, Signature};
use core::fmt::Debug;
use k256::{
    ecdsa::{
        recoverable,
        signature::{hazmat::PrehashSigner, Signature as _},
        SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};

impl From<VerifyingKey> for Address {
    fn from(key: VerifyingKey) -> Self {
        // The uncompressed EncodedPoint is always 65 bytes (tag + x + y).
        let mut pk_bytes = [0u8; 65];
        pk_bytes.copy_from_slice(key.to_encoded_point(false).as_bytes());
        Address::from_uncompressed_pubkey(&pk_bytes)
    }
}

pub struct Signer {
    key: SigningKey,
    addr: Address,
}

// Only show the address, never the key.
impl Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signer").field("addr", &self.addr).finish()
    }
}

impl Signer {
    /// Create a Signer with a fresh secret key drawn from `rng`.
    pub fn new<R: rand::Rng + rand::CryptoRng>(rng: &mut R) -> Self {
        let key = SigningKey::random(&mut *rng);
        let addr = key.verifying_key().into();
        Self { key, addr }
    }

    /// Create a Signer from a 32 byte big endian secret key.
    pub fn from_secret_key(secret_key: &[u8; 32]) -> Result<Self, Error> {
        let key = SigningKey::from_bytes(secret_key).map_err(|_| Error::InvalidSecretKey)?;
        let addr = key.verifying_key().into();
        Ok(Self { key, addr })
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Sign an arbitrary message, see [eth_signed_message_digest].
    pub fn sign_message(&self, msg: &[u8]) -> Result<Signature, Error> {
        self.sign_digest(eth_signed_message_digest(msg))
    }

    /// Sign a hash, i.e. a 32 byte message.
    pub fn sign_eth(&self, hash: Hash) -> Result<Signature, Error> {
        self.sign_message(&hash.0)
    }

    fn sign_digest(&self, digest: Hash) -> Result<Signature, Error> {
        let sig: recoverable::Signature = self
            .key
            .sign_prehash(&digest.0)
            .map_err(|_| Error::SigningFailed)?;

        // Luckily for us, this Signature type already has the format we need:
        // 65 bytes containing r, s and v in this order. We still have to add
        // 27 to v for the signature to be valid in the EVM.
        let mut sig_bytes = [0u8; 65];
        sig_bytes.copy_from_slice(sig.as_bytes());
        debug_assert!(sig_bytes[32] & 0x80 == 0);
        sig_bytes[64] += 27;

        Ok(Signature(sig_bytes))
    }
}

pub(super) fn recover_digest(digest: Hash, eth_sig: Signature) -> Result<Address, Error> {
    // Undo adding the 27, to go back to the format expected below
    let mut sig_bytes: [u8; 65] = eth_sig.0;
    sig_bytes[64] = recovery_id(eth_sig.v())?;

    let sig =
        recoverable::Signature::from_bytes(&sig_bytes).map_err(|_| Error::MalformedSignature)?;

    let verifying_key = sig
        .recover_verifying_key_from_digest_bytes(&digest.0.into())
        .map_err(|_| Error::RecoveryFailed)?;
    Ok(verifying_key.into())
}
