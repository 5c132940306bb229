//! Fund a channel by depositing into the adjudicator on-chain.
//!
//! Participants deposit one after the other, in the order of their
//! allocations in the outcome: we only deposit once everything allocated
//! before us is held on-chain, so nobody can take our deposit by withdrawing
//! early.

use super::{
    rounds::{FundingRounds, Round},
    side_effects::{ChainTransaction, SideEffects},
    ConstructionError, ObjectiveError, ObjectiveEvent, ObjectiveId, ObjectiveStatus, WaitingFor,
};
use crate::{
    abiencode::types::{Address, Hash},
    channel::{Channel, Funds, PartID, State},
    sig::Signer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectFundingObjective {
    status: ObjectiveStatus,
    channel: Channel,
    rounds: FundingRounds,

    /// Holdings that have to be on-chain before we deposit.
    my_deposit_safety_threshold: Funds,
    /// Holdings once our deposit went through.
    my_deposit_target: Funds,
    fully_funded_threshold: Funds,
    latest_holdings: Funds,

    /// Set once the deposit has been requested, it may not be executed yet.
    requested_deposit: bool,
}

impl DirectFundingObjective {
    /// Prepare funding the channel of `initial_state` as `my_address`.
    /// Nothing is signed yet.
    pub fn new(initial_state: State, my_address: Address) -> Result<Self, ConstructionError> {
        let outcome = initial_state.outcome().clone();
        let (channel, rounds) = FundingRounds::setup(initial_state, my_address)?;

        let me: Hash = my_address.into();
        let my_deposit_safety_threshold = outcome.deposit_safety_threshold(me);
        let my_deposit_target = my_deposit_safety_threshold
            .iter()
            .chain(outcome.total_for(me).iter())
            .map(|(asset, amount)| (*asset, *amount))
            .collect();

        Ok(DirectFundingObjective {
            status: ObjectiveStatus::Unapproved,
            channel,
            rounds,
            my_deposit_safety_threshold,
            my_deposit_target,
            fully_funded_threshold: outcome.total(),
            latest_holdings: Funds::new(),
            requested_deposit: false,
        })
    }

    pub fn id(&self) -> ObjectiveId {
        ObjectiveId::new("DirectFunding", self.channel.id())
    }

    pub fn status(&self) -> ObjectiveStatus {
        self.status
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn my_index(&self) -> PartID {
        self.rounds.my_index()
    }

    pub fn participant_index(&self, addr: &Address) -> Option<PartID> {
        self.rounds.participant_index(addr)
    }

    /// Hash of the prefund or postfund state.
    pub fn state_hash(&self, round: Round) -> Hash {
        self.rounds.hash(round)
    }

    pub fn pre_fund_signed(&self) -> &[bool] {
        self.rounds.signed(Round::PreFund)
    }

    pub fn post_fund_signed(&self) -> &[bool] {
        self.rounds.signed(Round::PostFund)
    }

    pub fn latest_holdings(&self) -> &Funds {
        &self.latest_holdings
    }

    pub fn approve(&self) -> Self {
        let mut updated = self.clone();
        updated.status = ObjectiveStatus::Approved;
        updated
    }

    pub fn reject(&self) -> Self {
        let mut updated = self.clone();
        updated.status = ObjectiveStatus::Rejected;
        updated
    }

    /// Apply `event` to a copy of this objective.
    ///
    /// Only fails if the event is about another channel. Signatures we
    /// can't attribute to a participant's prefund or postfund signature are
    /// dropped.
    pub fn update(&self, event: &ObjectiveEvent) -> Result<Self, ObjectiveError> {
        if event.channel_id != self.channel.id() {
            log::warn!("{}: event for channel {}", self.id(), event.channel_id);
            return Err(ObjectiveError::OutOfScope(event.channel_id));
        }

        let mut updated = self.clone();
        for (hash, sig) in &event.sigs {
            updated
                .rounds
                .record(&mut updated.channel, *hash, *sig);
        }

        if !event.states.is_empty() {
            log::trace!("{}: ignoring {} states", self.id(), event.states.len());
        }

        if let Some(holdings) = &event.holdings {
            log::debug!("{}: holdings {:?}", self.id(), holdings);
            updated.latest_holdings = holdings.clone();
        }

        Ok(updated)
    }

    /// Decide what to do next and return it as side effects. Advances at
    /// most one step per call.
    ///
    /// On error the objective is unchanged, `self` stays valid.
    pub fn crank(&self, signer: &Signer) -> Result<(Self, SideEffects, WaitingFor), ObjectiveError> {
        let mut updated = self.clone();
        let id = self.id();

        if updated.status != ObjectiveStatus::Approved {
            log::debug!("{}: not approved", id);
            return Err(ObjectiveError::NotApproved);
        }

        // Prefunding
        if !updated.rounds.signed_by_me(Round::PreFund) {
            let messages = updated
                .rounds
                .sign(&mut updated.channel, Round::PreFund, signer, &id)?;
            return Ok((updated, messages.into(), WaitingFor::CompletePrefund));
        }

        if !updated.rounds.complete(Round::PreFund) {
            return Ok((updated, SideEffects::none(), WaitingFor::CompletePrefund));
        }

        // Funding
        if !updated.requested_deposit && updated.safe_to_deposit() {
            updated.requested_deposit = true;

            let deposit = updated
                .my_deposit_target
                .saturating_sub(&updated.latest_holdings);
            if !deposit.is_non_zero() {
                return Ok((updated, SideEffects::none(), WaitingFor::CompleteFunding));
            }

            log::debug!("{}: depositing {:?}", id, deposit);
            let tx = ChainTransaction::Deposit {
                channel_id: updated.channel.id(),
                deposit,
            };
            return Ok((updated, tx.into(), WaitingFor::CompleteFunding));
        }

        if !updated.funding_complete() {
            return Ok((updated, SideEffects::none(), WaitingFor::CompleteFunding));
        }

        // Postfunding
        if !updated.rounds.signed_by_me(Round::PostFund) {
            let messages = updated
                .rounds
                .sign(&mut updated.channel, Round::PostFund, signer, &id)?;
            return Ok((updated, messages.into(), WaitingFor::CompletePostFund));
        }

        if !updated.rounds.complete(Round::PostFund) {
            return Ok((updated, SideEffects::none(), WaitingFor::CompletePostFund));
        }

        // Completion
        Ok((updated, SideEffects::none(), WaitingFor::Nothing))
    }

    /// Everything allocated before us is on-chain.
    fn safe_to_deposit(&self) -> bool {
        self.latest_holdings
            .covers(&self.my_deposit_safety_threshold)
    }

    fn funding_complete(&self) -> bool {
        self.latest_holdings.covers(&self.fully_funded_threshold)
    }
}
