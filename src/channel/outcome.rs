//! Rust representation of the Nitro `Outcome` (`ExitFormat`) Solidity types.

use super::funds::Funds;
use crate::abiencode::{
    as_bytes,
    types::{Address, Hash, U256},
};
use alloc::vec::Vec;
use serde::Serialize;

/// How an [Allocation] is paid out when the channel is concluded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AllocationType {
    /// Pay `amount` to `destination`.
    #[default]
    Simple,
    /// Reserve `amount` for the channel `destination`, see
    /// [Channel::guarantees_for][super::Channel::guarantees_for].
    Guarantee,
}

// Encoded as `uint8` on-chain.
impl Serialize for AllocationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(match self {
            AllocationType::Simple => 0,
            AllocationType::Guarantee => 1,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    /// Either an external address (left padded) or a channel id.
    pub destination: Hash,
    pub amount: U256,
    pub allocation_type: AllocationType,
    #[serde(with = "as_bytes")]
    pub metadata: Vec<u8>,
}

impl Allocation {
    pub fn simple(destination: Hash, amount: U256) -> Self {
        Allocation {
            destination,
            amount,
            ..Default::default()
        }
    }

    /// Guarantee `amount` to the channel `target`. `left` and `right` are the
    /// destinations the guarantee is taken from, in that order.
    pub fn guarantee(target: Hash, amount: U256, left: Hash, right: Hash) -> Self {
        let mut metadata = Vec::with_capacity(64);
        metadata.extend_from_slice(&left.0);
        metadata.extend_from_slice(&right.0);
        Allocation {
            destination: target,
            amount,
            allocation_type: AllocationType::Guarantee,
            metadata,
        }
    }
}

/// Allocations of a single asset.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SingleAssetExit {
    pub asset: Address,
    #[serde(with = "as_bytes")]
    pub metadata: Vec<u8>,
    pub allocations: Vec<Allocation>,
}

impl SingleAssetExit {
    pub fn new(asset: Address, allocations: Vec<Allocation>) -> Self {
        SingleAssetExit {
            asset,
            metadata: Vec::new(),
            allocations,
        }
    }

    pub fn total(&self) -> U256 {
        self.allocations
            .iter()
            .fold(U256::zero(), |acc, a| acc.saturating_add(a.amount))
    }
}

/// How the funds of a channel are distributed, one entry per asset.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Exit(pub Vec<SingleAssetExit>);

impl Exit {
    /// Sum of all allocations, per asset.
    pub fn total(&self) -> Funds {
        self.0.iter().map(|e| (e.asset, e.total())).collect()
    }

    /// Sum of the allocations paying into `destination`, per asset. Assets
    /// without such an allocation are left out.
    pub fn total_for(&self, destination: Hash) -> Funds {
        self.0
            .iter()
            .flat_map(|e| {
                e.allocations
                    .iter()
                    .filter(move |a| a.destination == destination)
                    .map(move |a| (e.asset, a.amount))
            })
            .collect()
    }

    /// Per asset, the sum of all allocations that come before the first one
    /// paying into `destination`. Those have to be funded on-chain before
    /// `destination` can deposit safely. Assets `destination` is not
    /// allocated anything of don't need a deposit and are left out.
    pub fn deposit_safety_threshold(&self, destination: Hash) -> Funds {
        self.0
            .iter()
            .filter_map(|e| {
                let first = e
                    .allocations
                    .iter()
                    .position(|a| a.destination == destination)?;
                let before = e.allocations[..first]
                    .iter()
                    .fold(U256::zero(), |acc, a| acc.saturating_add(a.amount));
                Some((e.asset, before))
            })
            .collect()
    }
}
