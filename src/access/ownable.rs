use crate::access::OwnerGate;
use crate::identity::Address;
use crate::token::LedgerError;
use serde::{Deserialize, Serialize};

/// Ledger owner record
///
/// Starts at the zero address, so nobody passes the gate until the ledger is
/// initialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Hand ownership to `new_owner`, returning the previous owner
    pub fn transfer(&mut self, caller: &Address, new_owner: Address) -> Result<Address, LedgerError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}

impl OwnerGate for Ownable {
    fn owner(&self) -> Address {
        self.owner
    }
}
