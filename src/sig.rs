//! Handles the creation and verification of (Ethereum) Signatures.
//!
//! Signatures are always over `keccak256("\x19Ethereum Signed Message:\n" +
//! len(message) + message)`, the format expected by the Solidity contracts
//! (EIP-191). Two backends are available: `k256` (pure Rust, works without
//! `std`) and `secp256k1` (bindings to libsecp256k1). If both features are
//! enabled, `secp256k1` is used.

use crate::abiencode::types::{Address, Hash, Signature};
use alloc::string::ToString;
use core::fmt::Display;
use sha3::{Digest, Keccak256};

#[cfg(not(any(feature = "k256", feature = "secp256k1")))]
compile_error!("enable one of the signer backends: `k256` or `secp256k1`");

#[cfg(feature = "k256")]
mod k256;
#[cfg(feature = "secp256k1")]
mod secp256k1;

#[cfg(all(feature = "k256", not(feature = "secp256k1")))]
use self::k256 as backend;
#[cfg(feature = "secp256k1")]
use self::secp256k1 as backend;

pub use backend::Signer;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The secret key is zero or not smaller than the curve order.
    InvalidSecretKey,
    /// The backend could not produce a signature.
    SigningFailed,
    /// `r`, `s` or `v` are out of range.
    MalformedSignature,
    /// The signature does not correspond to any point on the curve.
    RecoveryFailed,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Error::InvalidSecretKey => "invalid secret key",
            Error::SigningFailed => "signing failed",
            Error::MalformedSignature => "malformed signature",
            Error::RecoveryFailed => "public key recovery failed",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Add the `\x19Ethereum Signed Message:\n<length>` prefix to `message` and
/// hash the result.
///
/// The length is written in decimal, for a state hash this is always `32`.
/// Packed encoding => We can't use the abiencode serializer.
pub fn eth_signed_message_digest(message: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    Hash(hasher.finalize().into())
}

/// Recover the address that signed `message` with
/// [Signer::sign_message()].
///
/// This does not tell whether the signer is someone we know, only that the
/// signature is well formed.
pub fn recover_message_signer(message: &[u8], sig: Signature) -> Result<Address, Error> {
    backend::recover_digest(eth_signed_message_digest(message), sig)
}

/// Recover the address that signed `hash` with [Signer::sign_eth()].
///
/// Hash is the hash of the data, it should not include the `Ethereum Signed
/// Message` prefix.
pub fn recover_signer(hash: Hash, sig: Signature) -> Result<Address, Error> {
    recover_message_signer(&hash.0, sig)
}

/// Map `v` to the recovery id expected by the backends.
///
/// According to [EIP-2098](https://eips.ethereum.org/EIPS/eip-2098), the
/// yParity (v) is offset by 27 in Ethereum. We produce the offset form, but
/// accept the raw recovery id, too.
fn recovery_id(v: u8) -> Result<u8, Error> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - 27),
        _ => Err(Error::MalformedSignature),
    }
}
