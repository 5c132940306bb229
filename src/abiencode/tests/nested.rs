use super::types::Address;
use super::*;
use alloc::{vec, vec::Vec};

#[derive(Serialize, Debug)]
struct BytesContainer {
    #[serde(with = "as_bytes")]
    value: Vec<u8>,
}

impl BytesContainer {
    fn gen(base: u8) -> Self {
        Self {
            value: vec![0x01 | base, 0x02 | base, 0x03 | base, 0x04 | base],
        }
    }
}

#[derive(Serialize, Debug)]
struct NewtypeBytesContainer(#[serde(with = "as_bytes")] Vec<u8>);

fn bytes_container_expected() -> &'static str {
    /*
    ```solidity
        struct BytesContainerData {
            bytes a;
        }
        function BytesContainer() public pure returns(bytes memory) {
            BytesContainerData memory d;
            d.a = "\xa1\xa2\xa3\xa4";
            return abi.encode(d);
        }
    ```
    */
    "
    0000000000000000000000000000000000000000000000000000000000000020 // d offset
        0000000000000000000000000000000000000000000000000000000000000020 // d.a offset
            0000000000000000000000000000000000000000000000000000000000000004 // d.a length
            a1a2a3a400000000000000000000000000000000000000000000000000000000 // d.a
    "
}

#[test]
fn bytes_container() {
    serialize_and_compare(&BytesContainer::gen(0xa0), bytes_container_expected());
}

#[test]
fn bytes_container_newtype() {
    // A newtype struct is still a struct with one field.
    serialize_and_compare(
        &NewtypeBytesContainer(vec![0xa1, 0xa2, 0xa3, 0xa4]),
        bytes_container_expected(),
    );
}

#[test]
fn dynstruct_in_fixedarray() {
    /*
    ```solidity
        struct DynstructInFixedarrayInnerData {
            bytes v;
        }
        struct DynstructInFixedarrayData {
            DynstructInFixedarrayInnerData[2] a;
            bytes b;
        }
        function DynstructInFixedarray() public pure returns(bytes memory) {
            DynstructInFixedarrayData memory d;
            d.a[0].v = "\xa1\xa2\xa3\xa4";
            d.a[1].v = "\xb1\xb2\xb3\xb4";
            d.b = "\x11\x22\x33\x44\x55";
            return abi.encode(d);
        }
    ```
    */

    #[derive(Serialize, Debug)]
    struct DynstructInFixedarray {
        a: [BytesContainer; 2],
        #[serde(with = "as_bytes")]
        b: [u8; 5],
    }

    let d = DynstructInFixedarray {
        a: [BytesContainer::gen(0xa0), BytesContainer::gen(0xb0)],
        b: [0x11, 0x22, 0x33, 0x44, 0x55],
    };

    let expected = "
0000000000000000000000000000000000000000000000000000000000000020 // d offset
    0000000000000000000000000000000000000000000000000000000000000040 // d.a offset
    0000000000000000000000000000000000000000000000000000000000000140 // d.b offset
        0000000000000000000000000000000000000000000000000000000000000040 // d.a[0] offset
        00000000000000000000000000000000000000000000000000000000000000a0 // d.a[1] offset
            0000000000000000000000000000000000000000000000000000000000000020 // d.a[0].v offset
                0000000000000000000000000000000000000000000000000000000000000004 // d.a[0].v length
                a1a2a3a400000000000000000000000000000000000000000000000000000000 // d.a[0].v

            0000000000000000000000000000000000000000000000000000000000000020 // d.a[1].v offset
                0000000000000000000000000000000000000000000000000000000000000004 // d.a[1].v length
                b1b2b3b400000000000000000000000000000000000000000000000000000000 // d.a[1].v

        0000000000000000000000000000000000000000000000000000000000000005 // d.b length
        1122334455000000000000000000000000000000000000000000000000000000 // d.b
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn static_fields_around_dynamic_array() {
    #[derive(Serialize, Debug)]
    struct Mixed {
        x: u64,
        parts: Vec<Address>,
        y: bool,
    }

    let d = Mixed {
        x: 7,
        parts: vec![Address([0x11; 20]), Address([0x22; 20])],
        y: true,
    };

    let expected = "
    0000000000000000000000000000000000000000000000000000000000000020 // d offset
        0000000000000000000000000000000000000000000000000000000000000007 // d.x
        0000000000000000000000000000000000000000000000000000000000000060 // d.parts offset
        0000000000000000000000000000000000000000000000000000000000000001 // d.y
            0000000000000000000000000000000000000000000000000000000000000002 // d.parts length
            0000000000000000000000001111111111111111111111111111111111111111
            0000000000000000000000002222222222222222222222222222222222222222
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn hash_matches_encoding() {
    use sha3::{Digest, Keccak256};

    let d = vec![Address([0x11; 20])];
    let encoded = to_vec(&d).unwrap();
    let expected: [u8; 32] = Keccak256::digest(&encoded).into();

    assert_eq!(to_hash(&d).unwrap().0, expected);
}
