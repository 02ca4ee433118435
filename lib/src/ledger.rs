//! The asset-ledger collaborator the engine moves value through.

use crate::errors::LedgerError;
use alloy_primitives::{Address, U256};
use std::collections::{BTreeMap, BTreeSet};

/// Moves assets between participants and the engine's escrow. Each call either fully
/// succeeds or fails with no effect.
pub trait AssetLedger {
    /// Pulls `amount` of `asset` from `from` into the engine's escrow.
    fn escrow_pull(&mut self, asset: &Address, from: &Address, amount: U256)
        -> Result<(), LedgerError>;

    /// Credits `amount` of `asset` from the engine's escrow to `to`. Never pays out more than
    /// the escrow holds.
    fn credit(&mut self, asset: &Address, to: &Address, amount: U256) -> Result<(), LedgerError>;
}

/// An in-memory ledger holding participant balances and the engine's escrow per asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    /// Balances keyed by (asset, holder)
    balances: BTreeMap<(Address, Address), U256>,
    /// Escrow held by the engine, keyed by asset
    escrow: BTreeMap<Address, U256>,
    /// Recipients whose incoming credits are refused
    rejecting: BTreeSet<Address>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `holder` an extra `amount` of `asset`.
    pub fn mint(&mut self, asset: &Address, holder: &Address, amount: U256) {
        let balance = self.balances.entry((*asset, *holder)).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, asset: &Address, holder: &Address) -> U256 {
        self.balances
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Amount of `asset` currently held in the engine's escrow.
    pub fn escrowed(&self, asset: &Address) -> U256 {
        self.escrow.get(asset).copied().unwrap_or(U256::ZERO)
    }

    /// Makes every future credit to `recipient` fail, like a receiver that refuses transfers.
    pub fn reject_credits_to(&mut self, recipient: &Address) {
        self.rejecting.insert(*recipient);
    }

    pub fn accept_credits_to(&mut self, recipient: &Address) {
        self.rejecting.remove(recipient);
    }
}

impl AssetLedger for InMemoryLedger {
    fn escrow_pull(
        &mut self,
        asset: &Address,
        from: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: *asset,
                holder: *from,
                needed: amount,
                available,
            });
        }
        let held = self
            .escrowed(asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert((*asset, *from), available - amount);
        self.escrow.insert(*asset, held);
        Ok(())
    }

    fn credit(&mut self, asset: &Address, to: &Address, amount: U256) -> Result<(), LedgerError> {
        if self.rejecting.contains(to) {
            return Err(LedgerError::TransferRejected(*to));
        }
        let held = self.escrowed(asset);
        if held < amount {
            return Err(LedgerError::InsufficientEscrow {
                asset: *asset,
                needed: amount,
                available: held,
            });
        }
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.escrow.insert(*asset, held - amount);
        self.balances.insert((*asset, *to), balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_pull_and_credit() {
        let mut ledger = InMemoryLedger::new();
        let asset = Address::random();
        let alice = Address::random();
        let bob = Address::random();
        ledger.mint(&asset, &alice, U256::from(100));

        ledger.escrow_pull(&asset, &alice, U256::from(60)).unwrap();
        assert_eq!(ledger.balance_of(&asset, &alice), U256::from(40));
        assert_eq!(ledger.escrowed(&asset), U256::from(60));

        ledger.credit(&asset, &bob, U256::from(25)).unwrap();
        assert_eq!(ledger.balance_of(&asset, &bob), U256::from(25));
        assert_eq!(ledger.escrowed(&asset), U256::from(35));
    }

    #[test]
    fn test_escrow_pull_insufficient_balance() {
        let mut ledger = InMemoryLedger::new();
        let asset = Address::random();
        let alice = Address::random();
        ledger.mint(&asset, &alice, U256::from(10));
        let snapshot = ledger.clone();

        assert_eq!(
            ledger.escrow_pull(&asset, &alice, U256::from(11)),
            Err(LedgerError::InsufficientBalance {
                asset,
                holder: alice,
                needed: U256::from(11),
                available: U256::from(10),
            })
        );
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_credit_never_exceeds_escrow() {
        let mut ledger = InMemoryLedger::new();
        let asset = Address::random();
        let alice = Address::random();
        ledger.mint(&asset, &alice, U256::from(10));
        ledger.escrow_pull(&asset, &alice, U256::from(10)).unwrap();

        assert!(matches!(
            ledger.credit(&asset, &alice, U256::from(11)),
            Err(LedgerError::InsufficientEscrow { .. })
        ));
        assert_eq!(ledger.escrowed(&asset), U256::from(10));
    }

    #[test]
    fn test_rejected_credit() {
        let mut ledger = InMemoryLedger::new();
        let asset = Address::random();
        let alice = Address::random();
        ledger.mint(&asset, &alice, U256::from(10));
        ledger.escrow_pull(&asset, &alice, U256::from(10)).unwrap();

        ledger.reject_credits_to(&alice);
        assert_eq!(
            ledger.credit(&asset, &alice, U256::from(1)),
            Err(LedgerError::TransferRejected(alice))
        );

        ledger.accept_credits_to(&alice);
        ledger.credit(&asset, &alice, U256::from(1)).unwrap();
        assert_eq!(ledger.balance_of(&asset, &alice), U256::from(1));
    }
}
