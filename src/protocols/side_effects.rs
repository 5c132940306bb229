//! Declarative output of `crank`, executed by whoever drives the objectives.

use super::{ObjectiveEvent, ObjectiveId};
use crate::{
    abiencode::types::Address,
    channel::{ChannelId, Funds},
};
use alloc::vec::Vec;

/// Deliver `payload` to the peer `to`, who feeds it into the `update` of
/// its copy of the objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub to: Address,
    pub objective_id: ObjectiveId,
    pub payload: ObjectiveEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainTransaction {
    /// Deposit `deposit` into the adjudicator, on behalf of `channel_id`.
    Deposit { channel_id: ChannelId, deposit: Funds },
}

/// Ask the ledger channel `ledger_id` to guarantee `amount` to the channel
/// `destination`, taken from the two participants in `guarantee` (left,
/// right).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRequest {
    pub ledger_id: ChannelId,
    pub destination: ChannelId,
    pub amount: Funds,
    pub guarantee: [Address; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SideEffects {
    pub messages_to_send: Vec<Message>,
    pub transactions_to_submit: Vec<ChainTransaction>,
    pub ledger_requests: Vec<LedgerRequest>,
}

impl SideEffects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages_to_send.is_empty()
            && self.transactions_to_submit.is_empty()
            && self.ledger_requests.is_empty()
    }
}

impl From<Vec<Message>> for SideEffects {
    fn from(messages_to_send: Vec<Message>) -> Self {
        SideEffects {
            messages_to_send,
            ..Default::default()
        }
    }
}

impl From<Vec<LedgerRequest>> for SideEffects {
    fn from(ledger_requests: Vec<LedgerRequest>) -> Self {
        SideEffects {
            ledger_requests,
            ..Default::default()
        }
    }
}

impl From<ChainTransaction> for SideEffects {
    fn from(tx: ChainTransaction) -> Self {
        SideEffects {
            transactions_to_submit: alloc::vec![tx],
            ..Default::default()
        }
    }
}
