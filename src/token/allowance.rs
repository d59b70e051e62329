// Allowances - delegated spending, independent of provenance

use crate::identity::Address;
use crate::token::{Amount, LedgerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Approval value that `transfer_from` never decrements
pub const UNLIMITED_ALLOWANCE: Amount = Amount::MAX;

/// Effect of a `transfer_from` on the spender's allowance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowanceSpend {
    /// Allowance is the unlimited sentinel and stays as is
    Unlimited,
    /// Allowance becomes this value
    Remaining(Amount),
}

/// (owner, spender) -> approved amount
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Allowances {
    entries: BTreeMap<(Address, Address), Amount>,
}

impl Allowances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.entries.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Overwrite an allowance; zero removes the entry
    pub fn set(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if amount == 0 {
            self.entries.remove(&(*owner, *spender));
        } else {
            self.entries.insert((*owner, *spender), amount);
        }
    }

    /// Allowance after adding `added`
    pub fn increased(&self, owner: &Address, spender: &Address, added: Amount) -> Result<Amount, LedgerError> {
        self.allowance(owner, spender)
            .checked_add(added)
            .ok_or(LedgerError::Overflow)
    }

    /// Allowance after removing `subtracted`
    pub fn decreased(&self, owner: &Address, spender: &Address, subtracted: Amount) -> Result<Amount, LedgerError> {
        self.allowance(owner, spender)
            .checked_sub(subtracted)
            .ok_or(LedgerError::AllowanceBelowZero)
    }

    /// Check that `spender` may move `amount` of `owner`'s funds
    pub fn plan_spend(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<AllowanceSpend, LedgerError> {
        let available = self.allowance(owner, spender);
        if available == UNLIMITED_ALLOWANCE {
            return Ok(AllowanceSpend::Unlimited);
        }
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                available,
                required: amount,
            });
        }
        Ok(AllowanceSpend::Remaining(available - amount))
    }

    pub(crate) fn apply_spend(&mut self, owner: &Address, spender: &Address, spend: AllowanceSpend) {
        if let AllowanceSpend::Remaining(left) = spend {
            self.set(owner, spender, left);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
