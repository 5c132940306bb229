//! Constructors for objectives, channels and signatures used in the tests.

use super::ObjectiveEvent;
use crate::{
    abiencode::types::{Address, Hash, U256},
    channel::{Allocation, Channel, Exit, FixedPart, SingleAssetExit, State, VariablePart},
    sig::Signer,
};
use alloc::{vec, vec::Vec};
use hex::FromHex;

pub const ALICE_KEY: &str = "caab404f975b4620747174a75f08d98b4e5a7053b691b41bcfc0d839d48b7634";
pub const IRENE_KEY: &str = "febb3b74b0b52d0976f6571d555f4ac8b91c308dfa25c7b58d1e6a7c3f50c781";
pub const BOB_KEY: &str = "0279651921cd800ac560c21ceea27aab0107b67daf436cdd25ce84cad30159b4";
pub const MALLORY_KEY: &str = "2d999770f7b5d49b694080f987b82bbc9fc9ac2b4dcc10b0f8aba7d700f69c6d";

pub const ASSET: Address = Address([0xee; 20]);

pub fn signer(key: &str) -> Signer {
    let key = <[u8; 32]>::from_hex(key).unwrap();
    Signer::from_secret_key(&key).unwrap()
}

/// Alice, Irene (intermediary) and Bob.
pub fn actors() -> [Signer; 3] {
    [signer(ALICE_KEY), signer(IRENE_KEY), signer(BOB_KEY)]
}

pub fn addresses(signers: &[Signer]) -> Vec<Address> {
    signers.iter().map(|s| s.address()).collect()
}

/// One asset, paying `amount` to each of `payees`, in this order.
pub fn outcome(payees: &[(Address, u64)]) -> Exit {
    Exit(vec![SingleAssetExit::new(
        ASSET,
        payees
            .iter()
            .map(|(p, amount)| Allocation::simple((*p).into(), U256::from(*amount)))
            .collect(),
    )])
}

pub fn state(participants: Vec<Address>, outcome: Exit, nonce: u64) -> State {
    State::new(
        FixedPart {
            chain_id: 9001.into(),
            app_definition: participants[0],
            participants,
            channel_nonce: nonce.into(),
            challenge_duration: 60,
        },
        VariablePart {
            app_data: vec![],
            outcome,
            turn_num: 5,
            is_final: false,
        },
    )
}

/// The three party channel without any funds.
pub fn empty_state(signers: &[Signer]) -> State {
    state(addresses(signers), Exit::default(), 37140676580)
}

/// A ledger channel between `left` and `right` with 10 for each.
pub fn ledger(left: &Signer, right: &Signer) -> Channel {
    let participants = vec![left.address(), right.address()];
    let outcome = outcome(&[(left.address(), 10), (right.address(), 10)]);
    Channel::new(state(participants, outcome, 1)).unwrap()
}

/// The ledger state after moving `amount` from the payouts into a guarantee
/// for `target`.
pub fn guaranteeing_state(ledger: &Channel, target: Hash, amount: u64) -> State {
    let latest = ledger.latest_state().unwrap();
    let mut next = latest.with_turn_num(latest.turn_num() + 1);

    let [left, right]: [Address; 2] = ledger.participants().try_into().unwrap();
    let allocations = &mut next.variable.outcome.0[0].allocations;
    allocations[0].amount = allocations[0].amount - U256::from(amount);
    allocations.push(Allocation::guarantee(
        target,
        amount.into(),
        left.into(),
        right.into(),
    ));
    next
}

/// `signer`'s signature on `state`, as it would arrive from a peer. Events
/// carry one signature per state, so every signer needs its own event.
pub fn signed_by(channel_id: Hash, state: &State, signer: &Signer) -> ObjectiveEvent {
    let hash = state.hash().unwrap();
    ObjectiveEvent::new(channel_id).with_signature(hash, state.sign(signer).unwrap())
}
