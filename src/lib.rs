//! Off-chain funding objectives for Nitro state channels.
//!
//! An objective is a plain value: [Objective::update] ingests signatures
//! received from peers, [Objective::crank] decides what the local
//! participant has to do next and returns it as [protocols::SideEffects].
//! Executing those (sending messages, submitting transactions, updating
//! ledger channels) is left to the caller.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod abiencode {
    mod error;
    mod hashing;
    mod ser;
    mod token;

    pub mod as_bytes;
    pub mod types;

    pub use error::Error;
    pub use hashing::to_hash;
    #[cfg(test)]
    pub use ser::to_vec;
    pub use ser::to_writer;
    pub use token::Writer;

    #[cfg(test)]
    mod tests;
}
pub mod sig;

pub mod channel;
pub mod protocols;

pub use abiencode::types::{Address, Hash, Signature, U256};
pub use abiencode::Error as AbiEncodeError;
pub use protocols::{Objective, ObjectiveError, ObjectiveEvent, ObjectiveId, WaitingFor};
