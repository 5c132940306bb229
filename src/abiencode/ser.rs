//! Serde front-end of the ABI encoder.
//!
//! Maps the serde data model onto Solidity types:
//!
//! | serde                          | Solidity                         |
//! |--------------------------------|----------------------------------|
//! | `bool`, integers               | `bool`, `uintN`/`intN` (1 slot)  |
//! | `serialize_bytes`              | `bytesN` (static, left aligned)  |
//! | [as_bytes][super::as_bytes]    | `bytes` (dynamic)                |
//! | `str`                          | `string`                         |
//! | sequence (`Vec<T>`, `&[T]`)    | `T[]`                            |
//! | tuple, array, struct           | `(..)`, `T[N]`, `struct`         |
//!
//! Floats, maps, options, units and enums with data have no Solidity
//! counterpart and are rejected with [Error::TypeNotRepresentable].

use super::{
    error::{Error, Result},
    token::{Token, Writer, SLOT_SIZE},
};
use alloc::vec::Vec;
use serde::{
    ser::{
        self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
        SerializeTupleStruct, SerializeTupleVariant,
    },
    Serialize,
};

/// Newtype-struct name used by [as_bytes][super::as_bytes] to turn the
/// static `serialize_bytes` output into dynamic `bytes`. The characters have
/// no special meaning, they have just been chosen in a way that normal Rust
/// types will never have this name.
pub(super) const MARK_DYNAMIC_BYTES: &str = ":$&_DYNAMIC_BYTES";

/// Encode `value` like Solidity's `abi.encode(value)` and hand the slots to
/// `writer`.
pub fn to_writer<T, W>(value: &T, writer: &mut W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Writer,
{
    let token = value.serialize(Serializer)?;
    super::token::write_sequence(core::slice::from_ref(&token), writer);
    Ok(())
}

/// Encode `value` into a freshly allocated buffer, see [to_writer].
#[cfg(test)]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    to_writer(value, &mut buf)?;
    Ok(buf)
}

pub struct Serializer;

fn right_aligned<const N: usize>(v: [u8; N]) -> Token {
    let mut slot = [0u8; SLOT_SIZE];
    slot[SLOT_SIZE - N..].copy_from_slice(&v);
    Token::Word(slot)
}

fn signed<const N: usize>(negative: bool, v: [u8; N]) -> Token {
    let filler = if negative { 0xff } else { 0x00 };
    let mut slot = [filler; SLOT_SIZE];
    slot[SLOT_SIZE - N..].copy_from_slice(&v);
    Token::Word(slot)
}

impl ser::Serializer for Serializer {
    type Ok = Token;
    type Error = Error;

    type SerializeSeq = Compound;
    type SerializeTuple = Compound;
    type SerializeTupleStruct = Compound;
    type SerializeTupleVariant = Compound;
    type SerializeMap = Compound;
    type SerializeStruct = Compound;
    type SerializeStructVariant = Compound;

    fn serialize_bool(self, v: bool) -> Result<Token> {
        self.serialize_u8(u8::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Token> {
        Ok(signed(v < 0, v.to_be_bytes()))
    }

    fn serialize_i16(self, v: i16) -> Result<Token> {
        Ok(signed(v < 0, v.to_be_bytes()))
    }

    fn serialize_i32(self, v: i32) -> Result<Token> {
        Ok(signed(v < 0, v.to_be_bytes()))
    }

    fn serialize_i64(self, v: i64) -> Result<Token> {
        Ok(signed(v < 0, v.to_be_bytes()))
    }

    fn serialize_i128(self, v: i128) -> Result<Token> {
        Ok(signed(v < 0, v.to_be_bytes()))
    }

    fn serialize_u8(self, v: u8) -> Result<Token> {
        Ok(right_aligned(v.to_be_bytes()))
    }

    fn serialize_u16(self, v: u16) -> Result<Token> {
        Ok(right_aligned(v.to_be_bytes()))
    }

    fn serialize_u32(self, v: u32) -> Result<Token> {
        Ok(right_aligned(v.to_be_bytes()))
    }

    fn serialize_u64(self, v: u64) -> Result<Token> {
        Ok(right_aligned(v.to_be_bytes()))
    }

    fn serialize_u128(self, v: u128) -> Result<Token> {
        Ok(right_aligned(v.to_be_bytes()))
    }

    fn serialize_f32(self, _: f32) -> Result<Token> {
        Err(Error::TypeNotRepresentable("f32"))
    }

    fn serialize_f64(self, _: f64) -> Result<Token> {
        Err(Error::TypeNotRepresentable("f64"))
    }

    fn serialize_char(self, _: char) -> Result<Token> {
        Err(Error::TypeNotYetSupported("char"))
    }

    fn serialize_str(self, v: &str) -> Result<Token> {
        // Same layout as `bytes`.
        Ok(Token::Bytes(v.as_bytes().to_vec()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Token> {
        Ok(Token::Packed(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Token> {
        Err(Error::TypeNotRepresentable("none"))
    }

    fn serialize_some<T: ?Sized>(self, _: &T) -> Result<Token>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("some"))
    }

    fn serialize_unit(self) -> Result<Token> {
        Err(Error::TypeNotRepresentable("unit"))
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Token> {
        Err(Error::TypeNotRepresentable("unit struct"))
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<Token> {
        Err(Error::TypeNotRepresentable("unit variant (enum)"))
    }

    fn serialize_newtype_struct<T: ?Sized>(self, name: &'static str, value: &T) -> Result<Token>
    where
        T: Serialize,
    {
        let inner = value.serialize(Serializer)?;
        if name == MARK_DYNAMIC_BYTES {
            match inner {
                Token::Packed(v) => Ok(Token::Bytes(v)),
                // as_bytes always wraps serialize_bytes, anything else is a
                // misuse of the marker.
                _ => Err(Error::TypeNotRepresentable("marked bytes")),
            }
        } else {
            // A newtype struct is a struct with one field. Use
            // `#[serde(transparent)]` to get the inner encoding instead.
            Ok(Token::Tuple(alloc::vec![inner]))
        }
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Token>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("newtype variant (enum)"))
    }

    fn serialize_seq(self, size: Option<usize>) -> Result<Compound> {
        Ok(Compound::array(size.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound> {
        Ok(Compound::tuple(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Compound> {
        Ok(Compound::tuple(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Compound> {
        Err(Error::TypeNotRepresentable("tuple variant (enum)"))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Compound> {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn serialize_struct(self, _: &'static str, len: usize) -> Result<Compound> {
        Ok(Compound::tuple(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Compound> {
        Err(Error::TypeNotRepresentable("struct variant"))
    }

    fn collect_str<T: ?Sized>(self, _value: &T) -> Result<Token>
    where
        T: core::fmt::Display,
    {
        Err(Error::TypeNotYetSupported("collect_str"))
    }
}

/// Collects the elements of a sequence, tuple or struct.
pub struct Compound {
    items: Vec<Token>,
    dynamic_length: bool,
}

impl Compound {
    fn array(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
            dynamic_length: true,
        }
    }

    fn tuple(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
            dynamic_length: false,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn finish(self) -> Token {
        if self.dynamic_length {
            Token::Array(self.items)
        } else {
            Token::Tuple(self.items)
        }
    }
}

impl SerializeSeq for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Token> {
        Ok(self.finish())
    }
}

impl SerializeTuple for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Token> {
        Ok(self.finish())
    }
}

impl SerializeTupleStruct for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Token> {
        Ok(self.finish())
    }
}

impl SerializeStruct for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _name: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Token> {
        Ok(self.finish())
    }
}

// The remaining compound kinds are rejected when they are started, these
// impls only exist to satisfy the trait bounds.

impl SerializeTupleVariant for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("tuple variant (enum)"))
    }

    fn end(self) -> Result<Token> {
        Err(Error::TypeNotRepresentable("tuple variant (enum)"))
    }
}

impl SerializeMap for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, _key: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn serialize_value<T: ?Sized>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn end(self) -> Result<Token> {
        Err(Error::TypeNotRepresentable("map"))
    }
}

impl SerializeStructVariant for Compound {
    type Ok = Token;
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _key: &'static str, _value: &T) -> Result<()>
    where
        T: Serialize,
    {
        Err(Error::TypeNotRepresentable("struct variant"))
    }

    fn end(self) -> Result<Token> {
        Err(Error::TypeNotRepresentable("struct variant"))
    }
}
