use super::types::{Address, U256};
use super::*;
use alloc::{collections::BTreeMap, vec, vec::Vec};

#[test]
fn u64() {
    /*
    ```solidity
        function u64() public pure returns(bytes memory) {
            uint64 d = 0x1337000012341111;
            return abi.encode(d);
        }
    ```
    */
    let d: u64 = 0x1337000012341111;

    let expected = "
    0000000000000000000000000000000000000000000000001337000012341111
    ";
    serialize_and_compare(&d, expected)
}

#[test]
fn negative_i8() {
    let d: i8 = -2;

    let expected = "
    fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe
    ";
    serialize_and_compare(&d, expected)
}

#[test]
fn bool_and_u256() {
    let d = (true, U256::from(0x5555));

    // Static tuple => no offset in front.
    let expected = "
    0000000000000000000000000000000000000000000000000000000000000001
    0000000000000000000000000000000000000000000000000000000000005555
    ";
    serialize_and_compare(&d, expected)
}

#[test]
fn address_in_container() {
    /*
    ```solidity
        struct AddressContainerData {
            address a;
        }
        function AddressContainer() public pure returns(bytes memory) {
            AddressContainerData memory d;
            d.a = 0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5;
            return abi.encode(d);
        }
    ```
    */

    // Random address from etherscan, do not use!
    let addr = "95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5";
    let addr = Address(<[u8; 20]>::from_hex(addr).unwrap());

    #[derive(Serialize, Debug)]
    struct AddrContainer {
        a: Address,
    }

    let expected = "
    00000000000000000000000095222290dd7278aa3ddd389cc1e1d165cc4bafe5
    ";
    serialize_and_compare(&AddrContainer { a: addr }, expected)
}

#[test]
fn bytes() {
    /*
    ```solidity
        function Bytes() public pure returns(bytes memory) {
            bytes memory d;
            d = "\xa1\xa2\xa3\xa4";
            return abi.encode(d);
        }
    ```
    */
    #[derive(Serialize, Debug)]
    #[serde(transparent)]
    struct Bytes {
        #[serde(with = "as_bytes")]
        value: Vec<u8>,
    }

    let d = Bytes {
        value: vec![0xa1, 0xa2, 0xa3, 0xa4],
    };

    let expected = "
    0000000000000000000000000000000000000000000000000000000000000020
    0000000000000000000000000000000000000000000000000000000000000004
    a1a2a3a400000000000000000000000000000000000000000000000000000000
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn bytes_zerolen() {
    #[derive(Serialize, Debug)]
    #[serde(transparent)]
    struct Bytes(#[serde(with = "as_bytes")] Vec<u8>);

    // No data slot after the length.
    let expected = "
    0000000000000000000000000000000000000000000000000000000000000020
    0000000000000000000000000000000000000000000000000000000000000000
    ";
    serialize_and_compare(&Bytes(vec![]), expected);
}

#[test]
fn string() {
    let expected = "
    0000000000000000000000000000000000000000000000000000000000000020
    0000000000000000000000000000000000000000000000000000000000000005
    68656c6c6f000000000000000000000000000000000000000000000000000000
    ";
    serialize_and_compare(&"hello", expected);
}

#[test]
fn address_array() {
    let a = Address([0x11; 20]);
    let b = Address([0x22; 20]);

    let expected = "
    0000000000000000000000000000000000000000000000000000000000000020 // offset
    0000000000000000000000000000000000000000000000000000000000000002 // length
    0000000000000000000000001111111111111111111111111111111111111111
    0000000000000000000000002222222222222222222222222222222222222222
    ";
    serialize_and_compare(&vec![a, b], expected);
}

#[test]
fn not_representable() {
    assert_eq!(to_vec(&1.5f64), Err(Error::TypeNotRepresentable("f64")));

    let mut map = BTreeMap::new();
    map.insert(1u8, 2u8);
    assert_eq!(to_vec(&map), Err(Error::TypeNotRepresentable("map")));

    assert_eq!(
        to_vec(&Some(1u8)),
        Err(Error::TypeNotRepresentable("some"))
    );
}
