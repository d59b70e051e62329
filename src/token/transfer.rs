// Transfer allocator - moves value while keeping per-minter attribution
//
// A transfer only carries a scalar amount, so the allocator decides which
// provenance each unit carries: the sender's oldest-received minters drain first.

use crate::identity::Address;
use crate::token::{AccountLedger, Amount, LedgerError, ProvenanceBucket};

/// Validated value movement, computed against a read-only ledger view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    from: Address,
    to: Address,
    amount: Amount,
    /// (minter, take) pairs in the sender's FIFO order
    moves: Vec<ProvenanceBucket>,
}

impl TransferPlan {
    pub fn from(&self) -> &Address {
        &self.from
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn moves(&self) -> &[ProvenanceBucket] {
        &self.moves
    }
}

/// Work out which of the sender's buckets fund a transfer
///
/// Fails fast on a zero amount, a zero address or an insufficient balance.
/// Does not touch the ledger.
pub fn plan_transfer(
    accounts: &AccountLedger,
    from: &Address,
    to: &Address,
    amount: Amount,
) -> Result<TransferPlan, LedgerError> {
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if from.is_zero() || to.is_zero() {
        return Err(LedgerError::ZeroAddress);
    }

    let available = accounts.balance_of(from);
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            available,
            required: amount,
        });
    }

    let mut remaining = amount;
    let mut moves = Vec::new();
    for bucket in accounts.buckets(from) {
        if remaining == 0 {
            break;
        }
        let take = bucket.amount().min(remaining);
        moves.push(ProvenanceBucket::new(*bucket.minter(), take));
        remaining -= take;
    }

    if remaining != 0 {
        return Err(LedgerError::InvariantViolation(format!(
            "balance {} of {} covered only {} of {}",
            available,
            from,
            amount - remaining,
            amount
        )));
    }

    Ok(TransferPlan {
        from: *from,
        to: *to,
        amount,
        moves,
    })
}

/// Apply a plan on staged copies of both accounts and commit them together
///
/// A self-transfer moves nothing, so the account's bucket order is preserved.
pub(crate) fn apply_transfer(accounts: &mut AccountLedger, plan: &TransferPlan) -> Result<(), LedgerError> {
    if plan.from == plan.to {
        return Ok(());
    }

    let mut sender = accounts.staged(&plan.from);
    let mut recipient = accounts.staged(&plan.to);
    let mut moved: Amount = 0;

    for mv in &plan.moves {
        sender
            .debit(mv.minter(), mv.amount())
            .map_err(|e| LedgerError::InvariantViolation(format!("planned debit failed: {}", e)))?;
        recipient.credit(mv.minter(), mv.amount())?;
        moved = moved.checked_add(mv.amount()).ok_or(LedgerError::Overflow)?;
    }

    if moved != plan.amount {
        return Err(LedgerError::InvariantViolation(format!(
            "moved {} but transfer requested {}",
            moved, plan.amount
        )));
    }

    accounts.commit(&plan.from, sender);
    accounts.commit(&plan.to, recipient);
    Ok(())
}
