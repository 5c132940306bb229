//! Signature bookkeeping shared by the funding objectives.

use super::{side_effects::Message, ConstructionError, ObjectiveError, ObjectiveEvent, ObjectiveId};
use crate::{
    abiencode::types::{Address, Hash, Signature},
    channel::{Channel, PartID, State},
    sig::Signer,
};
use alloc::{collections::BTreeMap, vec, vec::Vec};

/// The two states every participant has to sign: the prefund state before
/// any funds are locked and the postfund state once the channel is funded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Round {
    PreFund,
    PostFund,
}

/// Who signed the prefund and postfund state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FundingRounds {
    participant_index: BTreeMap<Address, PartID>,
    my_index: PartID,
    pre_fund_hash: Hash,
    post_fund_hash: Hash,
    pre_fund_signed: Vec<bool>,
    post_fund_signed: Vec<bool>,
}

impl FundingRounds {
    /// Check that `me` can fund a channel starting at `initial_state` and
    /// create that channel.
    ///
    /// The initial state is the prefund state, the postfund state is the same
    /// state one turn later. Both are added to the returned channel so it
    /// accepts signatures on them. Nothing is signed.
    pub fn setup(initial_state: State, me: Address) -> Result<(Channel, Self), ConstructionError> {
        if initial_state.variable.is_final {
            return Err(ConstructionError::FinalInitialState);
        }

        let participants = initial_state.participants();
        if participants.len() < 2 {
            return Err(ConstructionError::TooFewParticipants);
        }

        let mut participant_index = BTreeMap::new();
        for (i, p) in participants.iter().enumerate() {
            if participant_index.insert(*p, i).is_some() {
                return Err(ConstructionError::DuplicateParticipant(*p));
            }
        }
        let my_index = *participant_index
            .get(&me)
            .ok_or(ConstructionError::NotAParticipant(me))?;
        let n = participants.len();

        let post_fund_turn = initial_state
            .turn_num()
            .checked_add(1)
            .ok_or(ConstructionError::TurnNumOverflow)?;
        let post_fund_state = initial_state.with_turn_num(post_fund_turn);

        let pre_fund_hash = initial_state.hash()?;
        let post_fund_hash = post_fund_state.hash()?;

        let mut channel = Channel::new(initial_state)?;
        channel.add_state(post_fund_state)?;

        Ok((
            channel,
            FundingRounds {
                participant_index,
                my_index,
                pre_fund_hash,
                post_fund_hash,
                pre_fund_signed: vec![false; n],
                post_fund_signed: vec![false; n],
            },
        ))
    }

    pub fn my_index(&self) -> PartID {
        self.my_index
    }

    pub fn participant_index(&self, addr: &Address) -> Option<PartID> {
        self.participant_index.get(addr).copied()
    }

    pub fn hash(&self, round: Round) -> Hash {
        match round {
            Round::PreFund => self.pre_fund_hash,
            Round::PostFund => self.post_fund_hash,
        }
    }

    pub fn signed(&self, round: Round) -> &[bool] {
        match round {
            Round::PreFund => &self.pre_fund_signed,
            Round::PostFund => &self.post_fund_signed,
        }
    }

    fn signed_mut(&mut self, round: Round) -> &mut [bool] {
        match round {
            Round::PreFund => &mut self.pre_fund_signed,
            Round::PostFund => &mut self.post_fund_signed,
        }
    }

    pub fn signed_by_me(&self, round: Round) -> bool {
        self.signed(round)[self.my_index]
    }

    pub fn complete(&self, round: Round) -> bool {
        self.signed(round).iter().all(|s| *s)
    }

    fn round_of(&self, hash: Hash) -> Option<Round> {
        if hash == self.pre_fund_hash {
            Some(Round::PreFund)
        } else if hash == self.post_fund_hash {
            Some(Round::PostFund)
        } else {
            None
        }
    }

    /// Record a signature received from a peer.
    ///
    /// Anything but a participant's signature on the prefund or postfund
    /// state is ignored.
    pub fn record(&mut self, channel: &mut Channel, hash: Hash, sig: Signature) {
        let round = match self.round_of(hash) {
            Some(round) => round,
            None => {
                log::trace!("channel {}: {} is not a funding state", channel.id(), hash);
                return;
            }
        };

        if let Some(part) = channel.add_signature(hash, sig) {
            self.signed_mut(round)[part] = true;
        }
    }

    /// Sign our state of `round` and record the signature.
    ///
    /// Returns the messages carrying the signature to all other
    /// participants.
    pub fn sign(
        &mut self,
        channel: &mut Channel,
        round: Round,
        signer: &Signer,
        objective_id: &ObjectiveId,
    ) -> Result<Vec<Message>, ObjectiveError> {
        let me = channel.participants()[self.my_index];
        if signer.address() != me {
            return Err(ObjectiveError::SignerMismatch(signer.address()));
        }

        let hash = self.hash(round);
        let sig = signer.sign_eth(hash)?;
        let me = self.my_index;
        let recorded = channel.add_signature(hash, sig);
        debug_assert_eq!(recorded, Some(me));
        self.signed_mut(round)[me] = true;
        log::debug!("{}: signed {:?} state", objective_id, round);

        let payload = ObjectiveEvent::new(channel.id()).with_signature(hash, sig);
        Ok(channel
            .participants()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.my_index)
            .map(|(_, to)| Message {
                to: *to,
                objective_id: objective_id.clone(),
                payload: payload.clone(),
            })
            .collect())
    }
}
