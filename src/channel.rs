//! Channel state model and the signed-state collection of a channel.

pub mod funds;
pub mod outcome;
pub mod state;

use crate::{
    abiencode::{
        self,
        types::{Address, Hash, Signature},
    },
    sig,
};
use alloc::collections::BTreeMap;
use core::fmt::Display;

pub use funds::Funds;
pub use outcome::{Allocation, AllocationType, Exit, SingleAssetExit};
pub use state::{FixedPart, State, VariablePart};

/// ID (Index) of a participant in the channel.
///
/// Given by the position in [FixedPart::participants].
pub type PartID = usize;

/// Identifies a channel, derived from its [FixedPart].
pub type ChannelId = Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Encoding(abiencode::Error),
    Signature(sig::Error),
}

impl From<abiencode::Error> for Error {
    fn from(e: abiencode::Error) -> Self {
        Self::Encoding(e)
    }
}

impl From<sig::Error> for Error {
    fn from(e: sig::Error) -> Self {
        Self::Signature(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Encoding(e) => write!(f, "abi encoding failed: {}", e),
            Error::Signature(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A state together with the participant signatures collected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedState {
    state: State,
    hash: Hash,
    sigs: BTreeMap<PartID, Signature>,
}

impl SignedState {
    fn new(state: State) -> Result<Self, abiencode::Error> {
        Ok(SignedState {
            hash: state.hash()?,
            state,
            sigs: BTreeMap::new(),
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn signature(&self, part: PartID) -> Option<Signature> {
        self.sigs.get(&part).copied()
    }

    pub fn has_signature_from(&self, part: PartID) -> bool {
        self.sigs.contains_key(&part)
    }

    /// Signed by every participant.
    pub fn is_supported(&self) -> bool {
        (0..self.state.participants().len()).all(|p| self.sigs.contains_key(&p))
    }
}

/// The runtime view of a channel: its parameters plus every state we know of
/// (one per turn number) and who signed it.
///
/// States are only ever added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    id: ChannelId,
    fixed_part: FixedPart,
    signed_states: BTreeMap<u64, SignedState>,
}

impl Channel {
    pub fn new(initial_state: State) -> Result<Self, abiencode::Error> {
        let id = initial_state.channel_id()?;
        let fixed_part = initial_state.fixed.clone();
        let signed = SignedState::new(initial_state)?;

        let mut signed_states = BTreeMap::new();
        signed_states.insert(signed.state.turn_num(), signed);

        Ok(Channel {
            id,
            fixed_part,
            signed_states,
        })
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn fixed_part(&self) -> &FixedPart {
        &self.fixed_part
    }

    pub fn participants(&self) -> &[Address] {
        &self.fixed_part.participants
    }

    /// Add a state we might receive signatures for. Returns whether the state
    /// is known afterwards: states of other channels, states older than the
    /// latest known one and states conflicting with a known state of the same
    /// turn are ignored.
    pub fn add_state(&mut self, state: State) -> Result<bool, abiencode::Error> {
        if state.fixed != self.fixed_part {
            log::trace!("channel {}: ignoring state of another channel", self.id);
            return Ok(false);
        }

        if let Some(latest) = self.signed_states.keys().next_back() {
            if state.turn_num() < *latest {
                log::trace!(
                    "channel {}: ignoring state for turn {}, already at {}",
                    self.id,
                    state.turn_num(),
                    latest
                );
                return Ok(false);
            }
        }

        let signed = SignedState::new(state)?;
        match self.signed_states.get(&signed.state.turn_num()) {
            Some(known) if known.hash == signed.hash => Ok(true),
            Some(_) => {
                log::trace!(
                    "channel {}: ignoring conflicting state for turn {}",
                    self.id,
                    signed.state.turn_num()
                );
                Ok(false)
            }
            None => {
                self.signed_states.insert(signed.state.turn_num(), signed);
                Ok(true)
            }
        }
    }

    /// Record `sig` for the state with hash `hash` if it was made by one of
    /// the participants.
    ///
    /// Unknown states, signatures that can't be recovered and signatures from
    /// non-participants are ignored. Returns the signer's index otherwise.
    pub fn add_signature(&mut self, hash: Hash, sig: Signature) -> Option<PartID> {
        let id = self.id;
        let participants = &self.fixed_part.participants;
        let signed = match self.signed_states.values_mut().find(|s| s.hash == hash) {
            Some(signed) => signed,
            None => {
                log::trace!("channel {}: signature for unknown state {}", id, hash);
                return None;
            }
        };

        let signer = match sig::recover_signer(hash, sig) {
            Ok(signer) => signer,
            Err(e) => {
                log::trace!("channel {}: ignoring signature: {}", id, e);
                return None;
            }
        };

        match participants.iter().position(|p| *p == signer) {
            Some(part) => {
                log::debug!(
                    "channel {}: signature from participant {} on turn {}",
                    id,
                    part,
                    signed.state.turn_num()
                );
                signed.sigs.insert(part, sig);
                Some(part)
            }
            None => {
                log::trace!("channel {}: {} is not a participant", id, signer);
                None
            }
        }
    }

    pub fn signed_state(&self, turn_num: u64) -> Option<&SignedState> {
        self.signed_states.get(&turn_num)
    }

    pub fn signed_states(&self) -> impl Iterator<Item = &SignedState> {
        self.signed_states.values()
    }

    /// The state with the highest turn number, signed or not.
    pub fn latest_state(&self) -> Option<&State> {
        self.signed_states.values().next_back().map(|s| &s.state)
    }

    /// The state with the highest turn number signed by every participant.
    pub fn latest_supported_state(&self) -> Option<&State> {
        self.signed_states
            .values()
            .rev()
            .find(|s| s.is_supported())
            .map(|s| &s.state)
    }

    /// Funds the latest supported state allocates to `destination`
    /// (usually another channel), per asset. Empty while no state is
    /// supported.
    pub fn guarantees_for(&self, destination: ChannelId) -> Funds {
        self.latest_supported_state()
            .map(|s| s.outcome().total_for(destination))
            .unwrap_or_default()
    }

    /// All funds in the channel, per asset. Uses the latest supported state
    /// or, if there is none yet, the latest state we know of.
    pub fn total(&self) -> Funds {
        self.latest_supported_state()
            .or_else(|| self.latest_state())
            .map(|s| s.outcome().total())
            .unwrap_or_default()
    }
}
