// Access module - owner and pause gates consulted by the ledger

mod ownable;
mod pausable;

pub use ownable::Ownable;
pub use pausable::Pausable;

use crate::identity::Address;
use crate::token::LedgerError;

/// Single-owner access control
pub trait OwnerGate {
    fn owner(&self) -> Address;

    fn is_owner(&self, caller: &Address) -> bool {
        let owner = self.owner();
        !owner.is_zero() && owner == *caller
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }
}

/// Global stop switch for mutating operations
pub trait PauseGate {
    fn is_paused(&self) -> bool;

    fn ensure_not_paused(&self) -> Result<(), LedgerError> {
        if self.is_paused() {
            Err(LedgerError::Paused)
        } else {
            Ok(())
        }
    }
}
