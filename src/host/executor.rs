// Executor - validates signed calls and applies them to the ledger in order

use crate::call::{unix_now, Call, CallId, CallValidator, SignedCall, ValidationError};
use crate::host::LedgerConfig;
use crate::identity::Address;
use crate::token::{LedgerError, LedgerEvent, TokenLedger};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Call rejected by ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Call validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate call: {0} was already executed")]
    DuplicateCall(CallId),

    #[error("Replay window full: {capacity} unexpired calls are tracked")]
    ReplayWindowFull { capacity: usize },

    #[error("State error: {0}")]
    StateError(String),
}

/// Outcome of an executed call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    call_id: CallId,
    caller: Address,
    operation: String,
    events: Vec<LedgerEvent>,
}

impl Receipt {
    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    pub fn caller(&self) -> &Address {
        &self.caller
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}

/// Everything the host persists: the ledger plus its replay window
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    ledger: TokenLedger,
    /// Executed call ids with their envelope timestamps, in execution order
    executed_calls: VecDeque<(CallId, u64)>,
    #[serde(skip)]
    executed_index: HashSet<CallId>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            ledger: TokenLedger::new(),
            ..Self::default()
        }
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn has_executed(&self, id: &CallId) -> bool {
        self.executed_index.contains(id)
    }

    pub fn executed_count(&self) -> usize {
        self.executed_calls.len()
    }

    /// Forget ids whose calls the validator would now refuse as expired
    ///
    /// Ids still inside the age window are never dropped. When the window is
    /// full of unexpired ids the call is refused instead.
    fn make_room(&mut self, now: u64, max_tracked: usize, max_age_secs: u64) -> Result<(), ExecutorError> {
        if self.executed_calls.len() < max_tracked {
            return Ok(());
        }
        // max_age_secs == 0 means calls never expire, so nothing may be forgotten
        if max_age_secs > 0 {
            let index = &mut self.executed_index;
            self.executed_calls.retain(|(id, timestamp)| {
                let live = timestamp.saturating_add(max_age_secs) >= now;
                if !live {
                    index.remove(id);
                }
                live
            });
        }
        if self.executed_calls.len() >= max_tracked {
            return Err(ExecutorError::ReplayWindowFull { capacity: max_tracked });
        }
        Ok(())
    }

    fn record(&mut self, id: CallId, timestamp: u64) {
        self.executed_calls.push_back((id, timestamp));
        self.executed_index.insert(id);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ExecutorError> {
        postcard::to_allocvec(self).map_err(|e| ExecutorError::StateError(e.to_string()))
    }

    /// Decode a snapshot and rebuild the indexes serialization skips
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExecutorError> {
        let mut state: LedgerState =
            postcard::from_bytes(bytes).map_err(|e| ExecutorError::StateError(e.to_string()))?;
        state.ledger.rebuild_indexes();
        state.executed_index = state.executed_calls.iter().map(|(id, _)| *id).collect();
        Ok(state)
    }
}

/// Apply one call on behalf of `caller`
///
/// Everything except `Initialize` is refused until the ledger has an owner.
pub fn dispatch(ledger: &mut TokenLedger, caller: &Address, call: &Call) -> Result<(), LedgerError> {
    if !ledger.is_initialized() && !matches!(call, Call::Initialize { .. }) {
        return Err(LedgerError::NotInitialized);
    }
    match call {
        Call::Initialize { name, symbol } => ledger.initialize(caller, name, symbol),
        Call::RegisterMinter { minter } => ledger.register_minter(caller, minter),
        Call::Mint { minter, amount, to } => ledger.mint(caller, minter, *amount, to),
        Call::Burn { minter, amount } => ledger.burn(caller, minter, *amount),
        Call::Transfer { to, amount } => ledger.transfer(caller, to, *amount),
        Call::TransferFrom { from, to, amount } => ledger.transfer_from(caller, from, to, *amount),
        Call::Approve { spender, amount } => ledger.approve(caller, spender, *amount),
        Call::IncreaseAllowance { spender, added } => ledger.increase_allowance(caller, spender, *added),
        Call::DecreaseAllowance { spender, subtracted } => {
            ledger.decrease_allowance(caller, spender, *subtracted)
        }
        Call::Pause => ledger.pause(caller),
        Call::Unpause => ledger.unpause(caller),
        Call::TransferOwnership { new_owner } => ledger.transfer_ownership(caller, new_owner),
        Call::UpgradeTo { logic_version } => ledger.upgrade_to(caller, *logic_version),
    }
}

/// Single-writer front door of the ledger
pub struct Executor {
    state: LedgerState,
    max_tracked_calls: usize,
    future_tolerance_secs: u64,
    max_call_age_secs: u64,
}

impl Executor {
    /// Start from an empty, uninitialized ledger
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_state(LedgerState::new(), config)
    }

    /// Resume from a persisted state
    pub fn with_state(state: LedgerState, config: &LedgerConfig) -> Self {
        Self {
            state,
            max_tracked_calls: config.max_tracked_calls.max(1),
            future_tolerance_secs: config.future_tolerance_secs,
            max_call_age_secs: config.max_call_age_secs,
        }
    }

    pub fn ledger(&self) -> &TokenLedger {
        self.state.ledger()
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    /// Put back a state taken before a call whose commit failed
    pub(crate) fn restore_state(&mut self, state: LedgerState) {
        self.state = state;
    }

    /// Authenticate, de-duplicate and execute a call
    ///
    /// A rejected call leaves the ledger untouched and is not remembered, so
    /// the same signed call may be resubmitted once the cause is fixed. An
    /// executed id is remembered for as long as its timestamp passes
    /// validation.
    pub fn submit(&mut self, signed: &SignedCall) -> Result<Receipt, ExecutorError> {
        let call_id = signed.id();
        let operation = signed.call().name();

        let envelope = CallValidator::validate_full(signed, self.future_tolerance_secs, self.max_call_age_secs)
            .map_err(|e| {
                warn!(%call_id, operation, error = %e, "call failed validation");
                ExecutorError::from(e)
            })?;

        if self.state.has_executed(&call_id) {
            warn!(%call_id, operation, "duplicate call rejected");
            return Err(ExecutorError::DuplicateCall(call_id));
        }

        if let Err(e) = self.state.make_room(unix_now(), self.max_tracked_calls, self.max_call_age_secs) {
            warn!(%call_id, operation, error = %e, "call refused");
            return Err(e);
        }

        let caller = envelope.caller_address();
        let timestamp = envelope.timestamp();
        if let Err(e) = dispatch(&mut self.state.ledger, &caller, envelope.call()) {
            warn!(%call_id, operation, %caller, error = %e, "call rejected");
            return Err(e.into());
        }

        self.state.record(call_id, timestamp);
        let events = self.state.ledger.take_events();
        debug!(%call_id, operation, %caller, events = events.len(), "call executed");

        Ok(Receipt {
            call_id,
            caller,
            operation: operation.to_string(),
            events,
        })
    }
}
