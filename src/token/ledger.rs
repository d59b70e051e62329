// Token Ledger - the mint/burn engine and the public ledger surface
//
// Every mutating operation follows the same shape: check gates, validate
// against the current state, compute every new value, then commit. Nothing is
// written before the last check passes.

use crate::access::{OwnerGate, Ownable, PauseGate, Pausable};
use crate::identity::Address;
use crate::token::transfer::apply_transfer;
use crate::token::{
    plan_transfer, AccountLedger, Allowances, Amount, LedgerError, LedgerEvent, MinterId,
    MinterRecord, MinterRegistry, ProvenanceBucket,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Fixed number of decimals of the token
pub const DECIMALS: u8 = 6;

/// Version of the persisted ledger layout
///
/// Persisted fields are only ever appended. Snapshots are postcard-encoded
/// and carry no field names, so appending one must bump this and add a
/// migration from the old layout before it can be loaded.
pub const LAYOUT_VERSION: u32 = 1;

/// Name, symbol and decimals set at initialization
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    name: String,
    symbol: String,
    decimals: u8,
}

impl TokenMetadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}

/// The provenance ledger
///
/// Holds the global totals, the minter registry, every account's buckets and
/// the allowance table. Single-threaded: share it through
/// [`crate::host::LedgerService`] when several tasks need it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    layout_version: u32,
    logic_version: u32,
    initialized: bool,
    metadata: TokenMetadata,
    ownable: Ownable,
    pausable: Pausable,
    total_supply: Amount,
    registry: MinterRegistry,
    accounts: AccountLedger,
    allowances: Allowances,
    /// Events of committed operations not yet drained by the host
    #[serde(skip)]
    pending_events: Vec<LedgerEvent>,
}

impl TokenLedger {
    /// Create an empty, uninitialized ledger
    pub fn new() -> Self {
        Self {
            layout_version: LAYOUT_VERSION,
            logic_version: 1,
            ..Self::default()
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// One-time setup; the deployer becomes the owner
    pub fn initialize(&mut self, deployer: &Address, name: &str, symbol: &str) -> Result<(), LedgerError> {
        if self.initialized {
            return Err(LedgerError::AlreadyInitialized);
        }
        if deployer.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if name.trim().is_empty() || symbol.trim().is_empty() {
            return Err(LedgerError::InvalidConfig("name and symbol must not be empty".to_string()));
        }

        self.initialized = true;
        self.metadata = TokenMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: DECIMALS,
        };
        self.ownable = Ownable::new(*deployer);

        info!(owner = %deployer, name, symbol, "ledger initialized");
        self.pending_events.push(LedgerEvent::Initialized {
            owner: *deployer,
            name: name.to_string(),
            symbol: symbol.to_string(),
        });
        Ok(())
    }

    /// Swap in a newer logic version; all ledger state carries over untouched
    pub fn upgrade_to(&mut self, caller: &Address, logic_version: u32) -> Result<(), LedgerError> {
        self.ownable.ensure_owner(caller)?;
        if logic_version <= self.logic_version {
            return Err(LedgerError::InvalidUpgrade {
                current: self.logic_version,
                requested: logic_version,
            });
        }

        let from_version = std::mem::replace(&mut self.logic_version, logic_version);
        info!(from_version, to_version = logic_version, "ledger logic upgraded");
        self.pending_events.push(LedgerEvent::Upgraded {
            from_version,
            to_version: logic_version,
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> Result<(), LedgerError> {
        let previous = self.ownable.transfer(caller, *new_owner)?;
        info!(%previous, new = %new_owner, "ownership transferred");
        self.pending_events.push(LedgerEvent::OwnershipTransferred {
            previous,
            new: *new_owner,
        });
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address) -> Result<(), LedgerError> {
        self.ownable.ensure_owner(caller)?;
        if self.pausable.pause() {
            info!(by = %caller, "ledger paused");
            self.pending_events.push(LedgerEvent::Paused { by: *caller });
        }
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), LedgerError> {
        self.ownable.ensure_owner(caller)?;
        if self.pausable.unpause() {
            info!(by = %caller, "ledger unpaused");
            self.pending_events.push(LedgerEvent::Unpaused { by: *caller });
        }
        Ok(())
    }

    // ========================================================================
    // MINTER REGISTRY
    // ========================================================================

    pub fn register_minter(&mut self, caller: &Address, minter: &MinterId) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        self.ownable.ensure_owner(caller)?;
        self.registry.register(*minter)?;

        debug!(%minter, "minter registered");
        self.pending_events.push(LedgerEvent::MinterAdded { minter: *minter });
        Ok(())
    }

    // ========================================================================
    // MINT / BURN
    // ========================================================================

    /// Issue `amount` under `minter` to `to` (the caller when `to` is zero)
    pub fn mint(&mut self, caller: &Address, minter: &MinterId, amount: Amount, to: &Address) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        self.ownable.ensure_owner(caller)?;
        if !self.registry.is_registered(minter) {
            return Err(LedgerError::UnknownMinter(*minter));
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let to = if to.is_zero() { *caller } else { *to };

        let issued = self.registry.issued_after_mint(minter, amount)?;
        let supply = self.total_supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let mut account = self.accounts.staged(&to);
        account.credit(minter, amount)?;

        self.accounts.commit(&to, account);
        self.registry.set_total_issued(minter, issued);
        self.total_supply = supply;

        debug!(%minter, %to, amount = %amount, "minted");
        self.pending_events.push(LedgerEvent::Minted { minter: *minter, to, amount });
        self.pending_events.push(LedgerEvent::Transfer {
            from: Address::ZERO,
            to,
            amount,
            provenance: vec![ProvenanceBucket::new(*minter, amount)],
        });
        Ok(())
    }

    /// Destroy `amount` of the caller's own `minter` bucket
    pub fn burn(&mut self, caller: &Address, minter: &MinterId, amount: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        self.ownable.ensure_owner(caller)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let mut account = self.accounts.staged(caller);
        account.debit(minter, amount)?;
        let issued = self.registry.issued_after_burn(minter, amount)?;
        let supply = self.total_supply.checked_sub(amount).ok_or_else(|| {
            LedgerError::InvariantViolation(format!("burn of {} exceeds total supply {}", amount, self.total_supply))
        })?;

        self.accounts.commit(caller, account);
        self.registry.set_total_issued(minter, issued);
        self.total_supply = supply;

        debug!(%minter, from = %caller, amount = %amount, "burned");
        self.pending_events.push(LedgerEvent::Burned { minter: *minter, from: *caller, amount });
        self.pending_events.push(LedgerEvent::Transfer {
            from: *caller,
            to: Address::ZERO,
            amount,
            provenance: vec![ProvenanceBucket::new(*minter, amount)],
        });
        Ok(())
    }

    // ========================================================================
    // TRANSFERS
    // ========================================================================

    /// Move `amount` from the caller to `to`, oldest minter buckets first
    ///
    /// Sending to yourself is checked like any transfer but debits and credits
    /// nothing, so the bucket order is left as it was.
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        let plan = plan_transfer(&self.accounts, caller, to, amount)?;
        apply_transfer(&mut self.accounts, &plan)?;

        debug!(from = %caller, %to, amount = %amount, buckets = plan.moves().len(), "transferred");
        self.pending_events.push(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
            provenance: plan.moves().to_vec(),
        });
        Ok(())
    }

    /// Move `from`'s funds on their behalf, consuming `spender`'s allowance
    pub fn transfer_from(&mut self, spender: &Address, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let spend = self.allowances.plan_spend(from, spender, amount)?;
        let plan = plan_transfer(&self.accounts, from, to, amount)?;
        apply_transfer(&mut self.accounts, &plan)?;
        self.allowances.apply_spend(from, spender, spend);

        debug!(%spender, %from, %to, amount = %amount, "transferred from");
        self.pending_events.push(LedgerEvent::Transfer {
            from: *from,
            to: *to,
            amount,
            provenance: plan.moves().to_vec(),
        });
        Ok(())
    }

    // ========================================================================
    // ALLOWANCES
    // ========================================================================

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    pub fn increase_allowance(&mut self, owner: &Address, spender: &Address, added: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let amount = self.allowances.increased(owner, spender, added)?;
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    pub fn decrease_allowance(&mut self, owner: &Address, spender: &Address, subtracted: Amount) -> Result<(), LedgerError> {
        self.pausable.ensure_not_paused()?;
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let amount = self.allowances.decreased(owner, spender, subtracted)?;
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.set(owner, spender, amount);
        debug!(%owner, %spender, amount = %amount, "allowance set");
        self.pending_events.push(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
    }

    // ========================================================================
    // VIEWS
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn symbol(&self) -> &str {
        self.metadata.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals()
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.pausable.is_paused()
    }

    pub fn logic_version(&self) -> u32 {
        self.logic_version
    }

    pub fn layout_version(&self) -> u32 {
        self.layout_version
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.balance_of(account)
    }

    pub fn balance_of_minter(&self, account: &Address, minter: &MinterId) -> Amount {
        self.accounts.balance_of_minter(account, minter)
    }

    /// Outstanding issuance of one minter across all holders
    pub fn total_balances_of_minter(&self, minter: &MinterId) -> Amount {
        self.registry.total_issued(minter)
    }

    pub fn is_registered(&self, minter: &MinterId) -> bool {
        self.registry.is_registered(minter)
    }

    pub fn minters(&self) -> &[MinterRecord] {
        self.registry.records()
    }

    /// An account's provenance buckets in FIFO order
    pub fn buckets(&self, account: &Address) -> &[ProvenanceBucket] {
        self.accounts.buckets(account)
    }

    pub fn accounts(&self) -> &AccountLedger {
        &self.accounts
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.allowance(owner, spender)
    }

    /// Drain events of operations committed since the last call
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ========================================================================
    // AUDIT
    // ========================================================================

    /// Recompute the conservation invariants from scratch
    ///
    /// Checks that supply, the sum of minter issuance and the sum of account
    /// balances agree, that each minter's issuance matches its buckets, and
    /// that no bucket is empty or attributed to an unregistered minter.
    pub fn check_invariants(&self) -> Result<(), LedgerError> {
        let mut per_minter: HashMap<MinterId, Amount> = HashMap::new();
        let mut balances: Amount = 0;

        for (address, account) in self.accounts.iter() {
            if account.is_empty() {
                return Err(violation(format!("account {} persisted without buckets", address)));
            }
            let mut seen = HashSet::new();
            for bucket in account.buckets() {
                if bucket.amount() == 0 {
                    return Err(violation(format!("zero bucket for {} in {}", bucket.minter(), address)));
                }
                if !self.registry.is_registered(bucket.minter()) {
                    return Err(violation(format!("bucket for unregistered minter {}", bucket.minter())));
                }
                if !seen.insert(*bucket.minter()) {
                    return Err(violation(format!("duplicate bucket for {} in {}", bucket.minter(), address)));
                }
                let slot = per_minter.entry(*bucket.minter()).or_insert(0);
                *slot = slot.checked_add(bucket.amount()).ok_or(LedgerError::Overflow)?;
                balances = balances.checked_add(bucket.amount()).ok_or(LedgerError::Overflow)?;
            }
        }

        for record in self.registry.records() {
            let held = per_minter.get(record.id()).copied().unwrap_or(0);
            if held != record.total_issued() {
                return Err(violation(format!(
                    "minter {} issued {} but holders have {}",
                    record.id(),
                    record.total_issued(),
                    held
                )));
            }
        }

        let issued = self.registry.total_outstanding().ok_or(LedgerError::Overflow)?;
        if issued != self.total_supply || balances != self.total_supply {
            return Err(violation(format!(
                "supply {} / issued {} / balances {} disagree",
                self.total_supply, issued, balances
            )));
        }
        Ok(())
    }

    /// Restore indexes skipped by serialization
    pub(crate) fn rebuild_indexes(&mut self) {
        self.registry.rebuild_index();
    }
}

fn violation(msg: String) -> LedgerError {
    LedgerError::InvariantViolation(msg)
}
