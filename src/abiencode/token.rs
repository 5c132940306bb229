//! Intermediate representation between the serde data model and the ABI
//! byte layout.
//!
//! The Serializer first turns a value into a [Token] tree, because the
//! Head/Tail layout of the ABI needs the size of every dynamic child before
//! the first slot can be written. Writing a tree is then a single pass.

use alloc::vec::Vec;

pub const SLOT_SIZE: usize = 32; // bytes

pub trait Writer {
    fn write(&mut self, slot: &[u8]);
}

impl Writer for Vec<u8> {
    fn write(&mut self, slot: &[u8]) {
        self.extend_from_slice(slot);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// One static slot: `uintN`, `intN`, `bool`.
    Word([u8; SLOT_SIZE]),
    /// Static bytes, right-padded to whole slots: `bytesN`, `address` and
    /// `uint256` (the latter two are already 32 bytes when they get here).
    Packed(Vec<u8>),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// Dynamic array `T[]`.
    Array(Vec<Token>),
    /// Structs, tuples and fixed-size arrays `T[N]`.
    Tuple(Vec<Token>),
}

pub fn word(n: usize) -> [u8; SLOT_SIZE] {
    let mut slot = [0u8; SLOT_SIZE];
    let bytes = (n as u64).to_be_bytes();
    slot[SLOT_SIZE - bytes.len()..].copy_from_slice(&bytes);
    slot
}

fn padded_len(len: usize) -> usize {
    (len + SLOT_SIZE - 1) / SLOT_SIZE * SLOT_SIZE
}

impl Token {
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Word(_) | Token::Packed(_) => false,
            Token::Bytes(_) | Token::Array(_) => true,
            Token::Tuple(items) => items.iter().any(Token::is_dynamic),
        }
    }

    /// Number of bytes this token occupies in the Head of its parent: one
    /// offset slot if it is dynamic, its full encoding otherwise.
    fn head_size(&self) -> usize {
        match self {
            Token::Word(_) => SLOT_SIZE,
            Token::Packed(v) => padded_len(v.len()),
            Token::Tuple(items) if !self.is_dynamic() => items.iter().map(Token::head_size).sum(),
            Token::Bytes(_) | Token::Array(_) | Token::Tuple(_) => SLOT_SIZE,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Token::Word(_) => SLOT_SIZE,
            Token::Packed(v) => padded_len(v.len()),
            Token::Bytes(v) => SLOT_SIZE + padded_len(v.len()),
            Token::Array(items) => SLOT_SIZE + sequence_len(items),
            Token::Tuple(items) => sequence_len(items),
        }
    }

    pub fn write<W: Writer>(&self, writer: &mut W) {
        match self {
            Token::Word(slot) => writer.write(slot),
            Token::Packed(v) => write_padded(v, writer),
            Token::Bytes(v) => {
                writer.write(&word(v.len()));
                write_padded(v, writer);
            }
            Token::Array(items) => {
                writer.write(&word(items.len()));
                write_sequence(items, writer);
            }
            Token::Tuple(items) => write_sequence(items, writer),
        }
    }
}

fn sequence_len(items: &[Token]) -> usize {
    items
        .iter()
        .map(|t| {
            if t.is_dynamic() {
                SLOT_SIZE + t.encoded_len()
            } else {
                t.head_size()
            }
        })
        .sum()
}

/// Write a list of values the way Solidity lays out function arguments and
/// struct fields: all Heads first, then the Tails of the dynamic values.
/// Offsets are relative to the start of the sequence.
pub fn write_sequence<W: Writer>(items: &[Token], writer: &mut W) {
    let mut offset: usize = items.iter().map(Token::head_size).sum();
    for item in items {
        if item.is_dynamic() {
            writer.write(&word(offset));
            offset += item.encoded_len();
        } else {
            item.write(writer);
        }
    }
    for item in items.iter().filter(|t| t.is_dynamic()) {
        item.write(writer);
    }
}

fn write_padded<W: Writer>(v: &[u8], writer: &mut W) {
    let iter = v.chunks_exact(SLOT_SIZE);
    let rem = iter.remainder();
    for chunk in iter {
        writer.write(chunk);
    }
    if !rem.is_empty() {
        let mut slot = [0u8; SLOT_SIZE];
        slot[..rem.len()].copy_from_slice(rem);
        writer.write(&slot);
    }
}
