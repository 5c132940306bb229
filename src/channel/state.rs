//! Rust representations of the Nitro `FixedPart`, `VariablePart` and `State`
//! Solidity types.

use super::{outcome::Exit, Error, PartID};
use crate::{
    abiencode::{
        self, as_bytes,
        types::{Address, Hash, Signature, U256},
    },
    sig::{self, Signer},
};
use alloc::vec::Vec;
use serde::Serialize;

/// Parameters that stay the same for the whole lifetime of a channel.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FixedPart {
    pub chain_id: U256,
    /// Order defines the index ([PartID]) of each participant.
    pub participants: Vec<Address>,
    pub channel_nonce: U256,
    pub app_definition: Address,
    pub challenge_duration: u64,
}

/// The part of [FixedPart] the channel id is derived from.
#[derive(Serialize)]
struct ChannelIdPreimage<'a> {
    chain_id: U256,
    participants: &'a [Address],
    channel_nonce: U256,
}

impl FixedPart {
    pub fn channel_id(&self) -> Result<Hash, abiencode::Error> {
        abiencode::to_hash(&ChannelIdPreimage {
            chain_id: self.chain_id,
            participants: &self.participants,
            channel_nonce: self.channel_nonce,
        })
    }

    pub fn participant_index(&self, addr: &Address) -> Option<PartID> {
        self.participants.iter().position(|p| p == addr)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct VariablePart {
    #[serde(with = "as_bytes")]
    pub app_data: Vec<u8>,
    pub outcome: Exit,
    pub turn_num: u64,
    pub is_final: bool,
}

/// What is actually signed, see [State::hash].
#[derive(Serialize)]
struct StatePreimage<'a> {
    channel_id: Hash,
    app_definition: Address,
    challenge_duration: u64,
    #[serde(with = "as_bytes")]
    app_data: &'a [u8],
    outcome: &'a Exit,
    turn_num: u64,
    is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub fixed: FixedPart,
    pub variable: VariablePart,
}

impl State {
    pub fn new(fixed: FixedPart, variable: VariablePart) -> Self {
        State { fixed, variable }
    }

    pub fn channel_id(&self) -> Result<Hash, abiencode::Error> {
        self.fixed.channel_id()
    }

    pub fn turn_num(&self) -> u64 {
        self.variable.turn_num
    }

    pub fn participants(&self) -> &[Address] {
        &self.fixed.participants
    }

    pub fn outcome(&self) -> &Exit {
        &self.variable.outcome
    }

    /// A copy of this state with a different turn number.
    pub fn with_turn_num(&self, turn_num: u64) -> Self {
        let mut next = self.clone();
        next.variable.turn_num = turn_num;
        next
    }

    /// Two states are the same signing target iff their hashes are equal.
    pub fn hash(&self) -> Result<Hash, abiencode::Error> {
        abiencode::to_hash(&StatePreimage {
            channel_id: self.channel_id()?,
            app_definition: self.fixed.app_definition,
            challenge_duration: self.fixed.challenge_duration,
            app_data: &self.variable.app_data,
            outcome: &self.variable.outcome,
            turn_num: self.variable.turn_num,
            is_final: self.variable.is_final,
        })
    }

    pub fn sign(&self, signer: &Signer) -> Result<Signature, Error> {
        Ok(signer.sign_eth(self.hash()?)?)
    }

    /// Recover who signed this state. Does not check whether that address
    /// is a participant.
    pub fn recover_signer(&self, sig: Signature) -> Result<Address, Error> {
        Ok(sig::recover_signer(self.hash()?, sig)?)
    }
}
