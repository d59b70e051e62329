// Account ledger - per-account provenance buckets in first-credit order

use crate::identity::Address;
use crate::token::{Amount, LedgerError, MinterId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much of an account's balance originated from one minter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceBucket {
    minter: MinterId,
    amount: Amount,
}

impl ProvenanceBucket {
    pub fn new(minter: MinterId, amount: Amount) -> Self {
        Self { minter, amount }
    }

    pub fn minter(&self) -> &MinterId {
        &self.minter
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// A holder's balance, split by minter
///
/// Buckets are unique per minter and never hold zero. Their order is the
/// order in which the account first received each minter's tokens; transfers
/// drain them front to back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    buckets: Vec<ProvenanceBucket>,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total balance (sum of all buckets)
    pub fn balance(&self) -> Amount {
        self.buckets.iter().map(|b| b.amount).sum()
    }

    /// Portion of the balance issued by `minter`
    pub fn balance_of_minter(&self, minter: &MinterId) -> Amount {
        self.position(minter).map(|i| self.buckets[i].amount).unwrap_or(0)
    }

    /// Buckets in FIFO order
    pub fn buckets(&self) -> &[ProvenanceBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn position(&self, minter: &MinterId) -> Option<usize> {
        self.buckets.iter().position(|b| &b.minter == minter)
    }

    /// Add `amount` to the bucket for `minter`, appending a new bucket on first credit
    pub fn credit(&mut self, minter: &MinterId, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        match self.position(minter) {
            Some(i) => {
                let bucket = &mut self.buckets[i];
                bucket.amount = bucket.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
            }
            None => self.buckets.push(ProvenanceBucket::new(*minter, amount)),
        }
        Ok(())
    }

    /// Remove `amount` from the bucket for `minter`, dropping the bucket at zero
    pub fn debit(&mut self, minter: &MinterId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of_minter(minter);
        if available < amount {
            return Err(LedgerError::InsufficientBucketBalance {
                minter: *minter,
                available,
                required: amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        // position exists: available >= amount > 0
        if let Some(i) = self.position(minter) {
            if available == amount {
                self.buckets.remove(i);
            } else {
                self.buckets[i].amount = available - amount;
            }
        }
        Ok(())
    }
}

/// All accounts on the ledger
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: BTreeMap<Address, Account>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total balance; zero for unknown accounts
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.accounts.get(address).map(Account::balance).unwrap_or(0)
    }

    pub fn balance_of_minter(&self, address: &Address, minter: &MinterId) -> Amount {
        self.accounts
            .get(address)
            .map(|a| a.balance_of_minter(minter))
            .unwrap_or(0)
    }

    /// Buckets of an account in FIFO order (empty for unknown accounts)
    pub fn buckets(&self, address: &Address) -> &[ProvenanceBucket] {
        self.accounts
            .get(address)
            .map(Account::buckets)
            .unwrap_or(&[])
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Accounts holding a non-zero balance, ordered by address
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn credit(&mut self, address: &Address, minter: &MinterId, amount: Amount) -> Result<(), LedgerError> {
        let mut account = self.staged(address);
        account.credit(minter, amount)?;
        self.commit(address, account);
        Ok(())
    }

    pub fn debit(&mut self, address: &Address, minter: &MinterId, amount: Amount) -> Result<(), LedgerError> {
        let mut account = self.staged(address);
        account.debit(minter, amount)?;
        self.commit(address, account);
        Ok(())
    }

    /// Working copy of an account; nothing changes until `commit`
    pub(crate) fn staged(&self, address: &Address) -> Account {
        self.accounts.get(address).cloned().unwrap_or_default()
    }

    /// Replace an account with a staged copy; empty accounts are dropped
    pub(crate) fn commit(&mut self, address: &Address, account: Account) {
        if account.is_empty() {
            self.accounts.remove(address);
        } else {
            self.accounts.insert(*address, account);
        }
    }
}
