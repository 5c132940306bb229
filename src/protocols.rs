//! Funding objectives.
//!
//! Each objective is an immutable value driven by two operations:
//!
//! - `update` ingests an [ObjectiveEvent] (signatures, states, holdings)
//!   received from peers or the chain watcher.
//! - `crank` inspects the result and decides what the local participant has
//!   to do next, which is returned as [SideEffects] together with what the
//!   objective is [WaitingFor].
//!
//! Both return a new value, the input is never modified.

mod rounds;
pub mod side_effects;

pub mod direct_fund;
pub mod virtual_fund;

#[cfg(test)]
mod test_fixtures;

use crate::{
    abiencode::{
        self,
        types::{Address, Hash, Signature},
    },
    channel::{self, ChannelId, Funds, State},
    sig::{self, Signer},
};
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt::Display;

pub use direct_fund::DirectFundingObjective;
pub use rounds::Round;
pub use side_effects::{ChainTransaction, LedgerRequest, Message, SideEffects};
pub use virtual_fund::VirtualFundingObjective;

/// Stable textual identifier of an objective: its kind followed by the id of
/// the channel it funds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectiveId(String);

impl ObjectiveId {
    fn new(kind: &str, channel_id: ChannelId) -> Self {
        ObjectiveId(alloc::format!("{}-{}", kind, channel_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectiveId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ObjectiveStatus {
    #[default]
    Unapproved,
    Approved,
    Rejected,
}

/// What an objective needs before it can make progress. Purely
/// informational, for UIs and logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WaitingFor {
    CompletePrefund,
    CompleteFunding,
    CompletePostFund,
    /// Done, or nothing can happen (e.g. not approved).
    Nothing,
}

impl Display for WaitingFor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            WaitingFor::CompletePrefund => "WaitingForCompletePrefund",
            WaitingFor::CompleteFunding => "WaitingForCompleteFunding",
            WaitingFor::CompletePostFund => "WaitingForCompletePostFund",
            WaitingFor::Nothing => "WaitingForNothing",
        })
    }
}

/// Input for `update`: facts about one channel.
///
/// Anything in here may be irrelevant or forged, objectives only pick up
/// what they can verify.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectiveEvent {
    pub channel_id: ChannelId,
    /// Signatures keyed by the hash of the state they sign.
    pub sigs: BTreeMap<Hash, Signature>,
    /// Candidate states, e.g. ledger channel updates proposed by a peer.
    pub states: Vec<State>,
    /// Funds held on-chain for the channel, reported by the chain watcher.
    pub holdings: Option<Funds>,
}

impl ObjectiveEvent {
    pub fn new(channel_id: ChannelId) -> Self {
        ObjectiveEvent {
            channel_id,
            ..Default::default()
        }
    }

    pub fn with_signature(mut self, state_hash: Hash, sig: Signature) -> Self {
        self.sigs.insert(state_hash, sig);
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    pub fn with_holdings(mut self, holdings: Funds) -> Self {
        self.holdings = Some(holdings);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveError {
    /// The event is about a channel this objective does not care about.
    OutOfScope(ChannelId),
    /// `crank` was called before the objective was approved.
    NotApproved,
    /// The key passed to `crank` does not belong to the local participant.
    SignerMismatch(Address),
    Signing(sig::Error),
    Encoding(abiencode::Error),
}

impl From<sig::Error> for ObjectiveError {
    fn from(e: sig::Error) -> Self {
        Self::Signing(e)
    }
}

impl From<abiencode::Error> for ObjectiveError {
    fn from(e: abiencode::Error) -> Self {
        Self::Encoding(e)
    }
}

impl From<channel::Error> for ObjectiveError {
    fn from(e: channel::Error) -> Self {
        match e {
            channel::Error::Encoding(e) => Self::Encoding(e),
            channel::Error::Signature(e) => Self::Signing(e),
        }
    }
}

impl Display for ObjectiveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ObjectiveError::OutOfScope(id) => {
                write!(f, "event channel id {} out of scope of objective", id)
            }
            ObjectiveError::NotApproved => f.write_str("objective not approved"),
            ObjectiveError::SignerMismatch(addr) => {
                write!(f, "{} is not the local participant", addr)
            }
            ObjectiveError::Signing(e) => write!(f, "{}", e),
            ObjectiveError::Encoding(e) => write!(f, "abi encoding failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ObjectiveError {}

/// Reasons why an objective can't be created from the given states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    NotAParticipant(Address),
    TooFewParticipants,
    DuplicateParticipant(Address),
    FinalInitialState,
    /// The postfund state would need a turn number past `u64::MAX`.
    TurnNumOverflow,
    /// Virtual funding needs one ledger channel per hop.
    LedgerCountMismatch { expected: usize, got: usize },
    /// The ledger channel at this index is not between the two participants
    /// of its hop.
    LedgerMismatch(usize),
    Encoding(abiencode::Error),
}

impl From<abiencode::Error> for ConstructionError {
    fn from(e: abiencode::Error) -> Self {
        Self::Encoding(e)
    }
}

impl Display for ConstructionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConstructionError::NotAParticipant(addr) => {
                write!(f, "{} is not a participant of the channel", addr)
            }
            ConstructionError::TooFewParticipants => {
                f.write_str("a channel needs at least two participants")
            }
            ConstructionError::DuplicateParticipant(addr) => {
                write!(f, "{} appears more than once in the participants", addr)
            }
            ConstructionError::FinalInitialState => f.write_str("initial state is final"),
            ConstructionError::TurnNumOverflow => f.write_str("turn number overflow"),
            ConstructionError::LedgerCountMismatch { expected, got } => {
                write!(f, "expected {} ledger channels, got {}", expected, got)
            }
            ConstructionError::LedgerMismatch(i) => {
                write!(f, "ledger channel {} does not connect the expected hops", i)
            }
            ConstructionError::Encoding(e) => write!(f, "abi encoding failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConstructionError {}

/// Any funding objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    DirectFunding(DirectFundingObjective),
    VirtualFunding(VirtualFundingObjective),
}

impl From<DirectFundingObjective> for Objective {
    fn from(o: DirectFundingObjective) -> Self {
        Objective::DirectFunding(o)
    }
}

impl From<VirtualFundingObjective> for Objective {
    fn from(o: VirtualFundingObjective) -> Self {
        Objective::VirtualFunding(o)
    }
}

impl Objective {
    pub fn id(&self) -> ObjectiveId {
        match self {
            Objective::DirectFunding(o) => o.id(),
            Objective::VirtualFunding(o) => o.id(),
        }
    }

    pub fn status(&self) -> ObjectiveStatus {
        match self {
            Objective::DirectFunding(o) => o.status(),
            Objective::VirtualFunding(o) => o.status(),
        }
    }

    pub fn approve(&self) -> Self {
        match self {
            Objective::DirectFunding(o) => o.approve().into(),
            Objective::VirtualFunding(o) => o.approve().into(),
        }
    }

    pub fn reject(&self) -> Self {
        match self {
            Objective::DirectFunding(o) => o.reject().into(),
            Objective::VirtualFunding(o) => o.reject().into(),
        }
    }

    /// See [DirectFundingObjective::update] and
    /// [VirtualFundingObjective::update].
    pub fn update(&self, event: &ObjectiveEvent) -> Result<Self, ObjectiveError> {
        Ok(match self {
            Objective::DirectFunding(o) => o.update(event)?.into(),
            Objective::VirtualFunding(o) => o.update(event)?.into(),
        })
    }

    /// See [DirectFundingObjective::crank] and
    /// [VirtualFundingObjective::crank].
    pub fn crank(&self, signer: &Signer) -> Result<(Self, SideEffects, WaitingFor), ObjectiveError> {
        Ok(match self {
            Objective::DirectFunding(o) => {
                let (o, effects, waiting_for) = o.crank(signer)?;
                (o.into(), effects, waiting_for)
            }
            Objective::VirtualFunding(o) => {
                let (o, effects, waiting_for) = o.crank(signer)?;
                (o.into(), effects, waiting_for)
            }
        })
    }
}
