//! Fund a joint channel `J` between Alice and Bob through a chain of ledger
//! channels `L`, without going on-chain.
//!
//! The participants of `J` are Alice (role `0`), the intermediaries (roles
//! `1..=n`) and Bob (role `n + 1`), where `n + 1 == L.len()` is the number
//! of hops. `L[i]` is the ledger channel between the participants with role
//! `i` and `i + 1`. Each of them guarantees the total of `J` to `J`.

use super::{
    rounds::{FundingRounds, Round},
    side_effects::{LedgerRequest, SideEffects},
    ConstructionError, ObjectiveError, ObjectiveEvent, ObjectiveId, ObjectiveStatus, WaitingFor,
};
use crate::{
    abiencode::types::{Address, Hash},
    channel::{Channel, ChannelId, PartID, State},
    sig::Signer,
};
use alloc::vec::Vec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFundingObjective {
    status: ObjectiveStatus,
    j: Channel,
    l: Vec<Channel>,
    my_role: usize,
    rounds: FundingRounds,

    /// Set once the ledger requests have been generated, they may not be
    /// executed yet.
    requested_ledger_updates: bool,
}

impl VirtualFundingObjective {
    /// Prepare funding the joint channel of `initial_state` as `my_address`,
    /// using the ledger channels `ledgers` (ordered from Alice to Bob).
    pub fn new(
        initial_state: State,
        my_address: Address,
        ledgers: Vec<Channel>,
    ) -> Result<Self, ConstructionError> {
        let (j, rounds) = FundingRounds::setup(initial_state, my_address)?;

        let hops = j.participants().len() - 1;
        if ledgers.len() != hops {
            return Err(ConstructionError::LedgerCountMismatch {
                expected: hops,
                got: ledgers.len(),
            });
        }

        for (i, ledger) in ledgers.iter().enumerate() {
            let hop = &j.participants()[i..=i + 1];
            if !hop.iter().all(|p| ledger.participants().contains(p)) {
                return Err(ConstructionError::LedgerMismatch(i));
            }
        }

        Ok(VirtualFundingObjective {
            status: ObjectiveStatus::Unapproved,
            my_role: rounds.my_index(),
            j,
            l: ledgers,
            rounds,
            requested_ledger_updates: false,
        })
    }

    pub fn id(&self) -> ObjectiveId {
        ObjectiveId::new("VirtualFundingAsTerminal", self.j.id())
    }

    pub fn status(&self) -> ObjectiveStatus {
        self.status
    }

    /// The joint channel.
    pub fn joint_channel(&self) -> &Channel {
        &self.j
    }

    pub fn ledger_channels(&self) -> &[Channel] {
        &self.l
    }

    /// `0` for Alice, `L.len()` for Bob, the hop otherwise.
    pub fn my_role(&self) -> usize {
        self.my_role
    }

    pub fn my_index(&self) -> PartID {
        self.rounds.my_index()
    }

    pub fn participant_index(&self, addr: &Address) -> Option<PartID> {
        self.rounds.participant_index(addr)
    }

    /// Hash of the prefund or postfund state of `J`.
    pub fn state_hash(&self, round: Round) -> Hash {
        self.rounds.hash(round)
    }

    pub fn pre_fund_signed(&self) -> &[bool] {
        self.rounds.signed(Round::PreFund)
    }

    pub fn post_fund_signed(&self) -> &[bool] {
        self.rounds.signed(Round::PostFund)
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
    /// Events about `J` work like in direct funding. Events about a ledger
    /// channel add its states and the participants' signatures on them,
    /// which is how we learn that a ledger guarantees `J`. Events about any
    /// other channel are rejected.
    pub fn update(&self, event: &ObjectiveEvent) -> Result<Self, ObjectiveError> {
        if !self.in_scope(event.channel_id) {
            log::warn!("{}: event for channel {}", self.id(), event.channel_id);
            return Err(ObjectiveError::OutOfScope(event.channel_id));
        }

        let mut updated = self.clone();

        if event.channel_id == updated.j.id() {
            for (hash, sig) in &event.sigs {
                updated.rounds.record(&mut updated.j, *hash, *sig);
            }
            if !event.states.is_empty() {
                log::trace!("{}: ignoring {} states", self.id(), event.states.len());
            }
            return Ok(updated);
        }

        if let Some(ledger) = updated.l.iter_mut().find(|l| l.id() == event.channel_id) {
            for state in &event.states {
                if let Err(e) = ledger.add_state(state.clone()) {
                    log::trace!("ledger {}: ignoring state: {}", ledger.id(), e);
                }
            }
            for (hash, sig) in &event.sigs {
                ledger.add_signature(*hash, *sig);
            }
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
                .sign(&mut updated.j, Round::PreFund, signer, &id)?;
            return Ok((updated, messages.into(), WaitingFor::CompletePrefund));
        }

        if !updated.rounds.complete(Round::PreFund) {
            return Ok((updated, SideEffects::none(), WaitingFor::CompletePrefund));
        }

        // Funding
        if !updated.requested_ledger_updates {
            updated.requested_ledger_updates = true;
            let requests = updated.ledger_requests();
            log::debug!("{}: requesting {} ledger updates", id, requests.len());
            return Ok((updated, requests.into(), WaitingFor::CompleteFunding));
        }

        if !updated.funding_complete() {
            return Ok((updated, SideEffects::none(), WaitingFor::CompleteFunding));
        }

        // Postfunding
        if !updated.rounds.signed_by_me(Round::PostFund) {
            let messages = updated
                .rounds
                .sign(&mut updated.j, Round::PostFund, signer, &id)?;
            return Ok((updated, messages.into(), WaitingFor::CompletePostFund));
        }

        if !updated.rounds.complete(Round::PostFund) {
            return Ok((updated, SideEffects::none(), WaitingFor::CompletePostFund));
        }

        // Completion
        Ok((updated, SideEffects::none(), WaitingFor::Nothing))
    }

    fn is_bob(&self) -> bool {
        self.my_role == self.l.len()
    }

    /// The ledger channel towards Bob guarantees something to `J`. Bob has
    /// none towards himself and checks the last one instead.
    fn funding_complete(&self) -> bool {
        let ledger = if self.is_bob() {
            &self.l[self.l.len() - 1]
        } else {
            &self.l[self.my_role]
        };
        ledger.guarantees_for(self.j.id()).is_non_zero()
    }

    /// One request per ledger channel we are part of: towards Alice unless
    /// we are Alice, towards Bob unless we are Bob.
    fn ledger_requests(&self) -> Vec<LedgerRequest> {
        let participants = self.j.participants();
        let request = |ledger: usize| LedgerRequest {
            ledger_id: self.l[ledger].id(),
            destination: self.j.id(),
            amount: self.j.total(),
            guarantee: [participants[ledger], participants[ledger + 1]],
        };

        let mut requests = Vec::with_capacity(2);
        if self.my_role > 0 {
            requests.push(request(self.my_role - 1));
        }
        if !self.is_bob() {
            requests.push(request(self.my_role));
        }
        requests
    }

    /// `J` or one of the ledger channels.
    fn in_scope(&self, channel_id: ChannelId) -> bool {
        channel_id == self.j.id() || self.l.iter().any(|l| l.id() == channel_id)
    }
}
