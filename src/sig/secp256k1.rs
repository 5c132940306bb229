//! Signer using the secp256k1 crate (bindings to libsecp256k1).

use super::{eth_signed_message_digest, recovery_id, Error};
use crate::abiencode::types::{Address, Hash, Signature};
use core::fmt::Debug;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};

pub struct Signer {
    secp: Secp256k1<All>,
    sk: SecretKey,
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
        Self::with_key(SecretKey::new(rng))
    }

    /// Create a Signer from a 32 byte big endian secret key.
    pub fn from_secret_key(secret_key: &[u8; 32]) -> Result<Self, Error> {
        let sk = SecretKey::from_slice(secret_key).map_err(|_| Error::InvalidSecretKey)?;
        Ok(Self::with_key(sk))
    }

    fn with_key(sk: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let addr = PublicKey::from_secret_key(&secp, &sk).into();
        Self { secp, sk, addr }
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Sign an arbitrary message, see [eth_signed_message_digest].
    pub fn sign_message(&self, msg: &[u8]) -> Result<Signature, Error> {
        Ok(self.sign_digest(eth_signed_message_digest(msg)))
    }

    /// Sign a hash, i.e. a 32 byte message.
    pub fn sign_eth(&self, hash: Hash) -> Result<Signature, Error> {
        self.sign_message(&hash.0)
    }

    fn sign_digest(&self, digest: Hash) -> Signature {
        // We have to use sign_ecdsa_recoverable because the smart contract must be
        // able to recover the address. This gives us the additional information
        // needed for v.
        let sig = self
            .secp
            .sign_ecdsa_recoverable(&Message::from(digest), &self.sk);
        let (v, rs) = sig.serialize_compact();

        // [EIP-2](https://eips.ethereum.org/EIPS/eip-2) makes all signatures
        // with a non-canonical s invalid, libsecp256k1 only produces
        // canonical ones.
        debug_assert!(rs[32] & 0x80 == 0);

        Signature::new(&rs, 27 + v.to_i32() as u8)
    }
}

pub(super) fn recover_digest(digest: Hash, eth_sig: Signature) -> Result<Address, Error> {
    let secp = Secp256k1::verification_only();

    let recid = RecoveryId::from_i32(recovery_id(eth_sig.v())?.into())
        .map_err(|_| Error::MalformedSignature)?;
    let sig = RecoverableSignature::from_compact(&eth_sig.0[..64], recid)
        .map_err(|_| Error::MalformedSignature)?;

    let pk = secp
        .recover_ecdsa(&Message::from(digest), &sig)
        .map_err(|_| Error::RecoveryFailed)?;

    Ok(pk.into())
}
