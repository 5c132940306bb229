use crate::abiencode::types::{Address, U256};
use alloc::collections::{btree_map, BTreeMap};

/// Amounts per asset (asset holder address).
///
/// Missing assets count as zero, so `{A: 0}` and `{}` compare equal in all
/// the queries below (but not with `==`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Funds(BTreeMap<Address, U256>);

impl Funds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset: &Address) -> U256 {
        self.0.get(asset).copied().unwrap_or_default()
    }

    /// Add `amount` to `asset`, saturating at `U256::MAX`.
    pub fn add(&mut self, asset: Address, amount: U256) {
        let entry = self.0.entry(asset).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Address, U256> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if at least one asset has a non-zero amount.
    pub fn is_non_zero(&self) -> bool {
        self.0.values().any(|v| !v.is_zero())
    }

    /// True if, for every asset in `other`, we hold at least as much.
    pub fn covers(&self, other: &Funds) -> bool {
        other.iter().all(|(asset, amount)| self.get(asset) >= *amount)
    }

    /// Per asset `self - other`, clamped at zero. Assets that end up at zero
    /// are dropped.
    pub fn saturating_sub(&self, other: &Funds) -> Funds {
        self.iter()
            .map(|(asset, amount)| (*asset, amount.saturating_sub(other.get(asset))))
            .filter(|(_, amount)| !amount.is_zero())
            .collect()
    }
}

impl FromIterator<(Address, U256)> for Funds {
    /// Amounts of the same asset are summed up.
    fn from_iter<T: IntoIterator<Item = (Address, U256)>>(iter: T) -> Self {
        let mut funds = Funds::new();
        for (asset, amount) in iter {
            funds.add(asset, amount);
        }
        funds
    }
}

impl<'a> IntoIterator for &'a Funds {
    type Item = (&'a Address, &'a U256);
    type IntoIter = btree_map::Iter<'a, Address, U256>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
