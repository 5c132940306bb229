use super::{eth_signed_message_digest, recover_message_signer, recover_signer, Error, Signer};
use crate::{
    abiencode::{self, as_bytes, types::Signature},
    Hash,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use sha3::{Digest, Keccak256};
use uint::hex::ToHex;

fn data() -> Hash {
    /*
    ```solidity
    function verify_sig(address signer, bytes memory sig) public pure {
        bytes memory d;
        d = "\xa1\xa2\xa3\xa4";
        require(Sig.verify(abi.encode(d), sig, signer), "invalid signature");
    }
    ```
    */

    #[derive(Serialize, Debug)]
    #[serde(transparent)]
    struct Bytes {
        #[serde(with = "as_bytes")]
        value: [u8; 4],
    }
    let d = Bytes {
        value: [0xa1, 0xa2, 0xa3, 0xa4],
    };

    abiencode::to_hash(&d).unwrap()
}

macro_rules! make_compare_hardcoded {
    ($name:ident, $signer:ty, $address:literal, $expected_sig:literal) => {
        #[test]
        fn $name() {
            // This test may break in the future (e.g. if the dependency changes
            // internally), they exist to allow checking if a signature is valid
            // on-chain without needing a real blockchain or ganache.

            // Do not use that on any real device, this is just for testing.
            let mut rng = StdRng::seed_from_u64(0);
            let signer = <$signer>::new(&mut rng);
            let sig = signer.sign_eth(data()).unwrap();

            let address = $address;
            let expected_sig = $expected_sig;

            // Sanity checks for macro user input
            assert_eq!(address.len(), 20 * 2);
            assert_eq!(expected_sig.len(), 2 + 65 * 2);

            assert_eq!(signer.address().0.encode_hex::<String>(), address);
            assert_eq!(sig.0.encode_hex::<String>(), &expected_sig[2..]);
        }
    };
}

macro_rules! make_a_to_b {
    ($name:ident, $signer:ty, $verifier:path) => {
        #[test]
        fn $name() {
            // Do not use that on any real device, this is just for testing.
            let mut rng = StdRng::seed_from_u64(0);
            let signer = <$signer>::new(&mut rng);
            let msg = data();
            let sig = signer.sign_eth(msg).unwrap();

            let address = $verifier(eth_signed_message_digest(&msg.0), sig).unwrap();

            assert_eq!(address, signer.address());
        }
    };
}

// Note that the outputs of the following do not necessary have to be equal,
// they may depend on how exactly each library uses the random number generator.
#[cfg(feature = "secp256k1")]
make_compare_hardcoded!(
    secp256k1_sign,
    super::secp256k1::Signer,
    "a9572220348b1080264e81c0779f77c144790cd6",
    "0xdb101ce5201d7a04b67bdfe5c50b910524c62c0900c85997fd187a7b4e56aa990f96e031be10092befa49e713218cb14c75a6f6a5aa4699d969f4348f873f0151b"
);

#[cfg(feature = "k256")]
make_compare_hardcoded!(
    k256_sign,
    super::k256::Signer,
    "a9572220348b1080264e81c0779f77c144790cd6",
    "0xdb101ce5201d7a04b67bdfe5c50b910524c62c0900c85997fd187a7b4e56aa990f96e031be10092befa49e713218cb14c75a6f6a5aa4699d969f4348f873f0151b"
);

#[cfg(feature = "secp256k1")]
make_a_to_b!(
    secp256k1_to_secp256k1,
    super::secp256k1::Signer,
    super::secp256k1::recover_digest
);

#[cfg(feature = "k256")]
make_a_to_b!(
    k256_to_k256,
    super::k256::Signer,
    super::k256::recover_digest
);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    secp256k1_to_k256,
    super::secp256k1::Signer,
    super::k256::recover_digest
);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    k256_to_secp256k1,
    super::k256::Signer,
    super::secp256k1::recover_digest
);

#[test]
fn digest_prefix_uses_decimal_length() {
    let msg = [0x42u8; 123];
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n123");
    hasher.update(msg);
    let expected: [u8; 32] = hasher.finalize().into();

    assert_eq!(eth_signed_message_digest(&msg).0, expected);
}

#[test]
fn sign_and_recover_message() {
    let mut rng = StdRng::seed_from_u64(1);
    let signer = Signer::new(&mut rng);

    let sig = signer.sign_message(b"state channels").unwrap();
    assert!(sig.v() == 27 || sig.v() == 28);
    assert_eq!(
        recover_message_signer(b"state channels", sig).unwrap(),
        signer.address()
    );

    // Different message => different (valid) address.
    assert_ne!(
        recover_message_signer(b"state channel", sig).unwrap(),
        signer.address()
    );
}

#[test]
fn recovery_accepts_raw_recovery_id() {
    let mut rng = StdRng::seed_from_u64(2);
    let signer = Signer::new(&mut rng);
    let hash = data();

    let sig = signer.sign_eth(hash).unwrap();
    let raw = Signature::new(&sig.0[..64].try_into().unwrap(), sig.v() - 27);

    assert_eq!(recover_signer(hash, raw).unwrap(), signer.address());
}

#[test]
fn from_secret_key_is_deterministic() {
    let key = [0x17u8; 32];
    let a = Signer::from_secret_key(&key).unwrap();
    let b = Signer::from_secret_key(&key).unwrap();
    assert_eq!(a.address(), b.address());

    let sig = a.sign_eth(data()).unwrap();
    assert_eq!(recover_signer(data(), sig).unwrap(), a.address());
}

#[test]
fn zero_secret_key_is_rejected() {
    assert_eq!(
        Signer::from_secret_key(&[0u8; 32]).unwrap_err(),
        Error::InvalidSecretKey
    );
}

#[test]
fn malformed_signatures() {
    // v out of range must not wrap around.
    let mut bytes = [0x11u8; 65];
    bytes[64] = 5;
    assert_eq!(
        recover_signer(data(), Signature(bytes)).unwrap_err(),
        Error::MalformedSignature
    );

    // r == s == 0 is never valid.
    assert!(recover_signer(data(), Signature::default()).is_err());
}
