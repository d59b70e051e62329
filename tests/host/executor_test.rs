use provledger::call::{Call, CallBuilder, SignedCall, ValidationError};
use provledger::host::{dispatch, Executor, ExecutorError, LedgerConfig, LedgerState};
use provledger::identity::{Address, Keypair};
use provledger::token::{LedgerError, LedgerEvent, MinterId, TokenLedger};

fn sign(keypair: &Keypair, call: Call) -> SignedCall {
    CallBuilder::new().signer(keypair).call(call).build().expect("build call")
}

fn m1() -> MinterId {
    MinterId::from_label("minter1").expect("label")
}

/// Executor with an initialized ledger, minter1 registered, owned by `owner`
fn bootstrapped(owner: &Keypair) -> Executor {
    let mut executor = Executor::new(&LedgerConfig::default());
    executor
        .submit(&sign(owner, Call::Initialize { name: "WUSD".into(), symbol: "wusd".into() }))
        .expect("initialize");
    executor
        .submit(&sign(owner, Call::RegisterMinter { minter: m1() }))
        .expect("register");
    executor
}

// ============================================================================
// SUBMIT
// ============================================================================

/// Test: The signer of a call is the caller the ledger sees
#[test]
fn test_submit_attributes_caller() {
    let owner = Keypair::generate();
    let mut executor = bootstrapped(&owner);

    let receipt = executor
        .submit(&sign(&owner, Call::Mint { minter: m1(), amount: 1_000, to: Address::ZERO }))
        .expect("mint");

    assert_eq!(receipt.caller(), &owner.address());
    assert_eq!(receipt.operation(), "mint");
    assert_eq!(receipt.events().len(), 2);
    assert!(matches!(receipt.events()[0], LedgerEvent::Minted { amount: 1_000, .. }));
    assert_eq!(executor.ledger().balance_of(&owner.address()), 1_000);
    assert_eq!(executor.ledger().owner(), owner.address());
}

/// Test: Other signers are not the owner
#[test]
fn test_submit_non_owner_rejected() {
    let owner = Keypair::generate();
    let intruder = Keypair::generate();
    let mut executor = bootstrapped(&owner);

    let result = executor.submit(&sign(&intruder, Call::Pause));
    assert_eq!(result.err(), Some(ExecutorError::Ledger(LedgerError::Unauthorized)));
    assert!(!executor.ledger().is_paused());
}

/// Test: Only initialize is accepted before the ledger has an owner
#[test]
fn test_uninitialized_ledger_refuses_calls() {
    let caller = Keypair::generate();
    let mut executor = Executor::new(&LedgerConfig::default());

    let result = executor.submit(&sign(&caller, Call::Transfer { to: Address::from_bytes([5; 20]), amount: 1 }));
    assert_eq!(result.err(), Some(ExecutorError::Ledger(LedgerError::NotInitialized)));
    assert_eq!(executor.state().executed_count(), 0);
}

/// Test: Replaying a committed call is refused
#[test]
fn test_duplicate_call_rejected() {
    let owner = Keypair::generate();
    let mut executor = bootstrapped(&owner);
    let call = sign(&owner, Call::Mint { minter: m1(), amount: 10, to: Address::ZERO });

    executor.submit(&call).expect("first submit");
    let result = executor.submit(&call);

    assert_eq!(result.err(), Some(ExecutorError::DuplicateCall(call.id())));
    assert_eq!(executor.ledger().total_supply(), 10);
}

/// Test: A rejected call is not remembered and may be retried later
#[test]
fn test_rejected_call_can_be_retried() {
    let owner = Keypair::generate();
    let user = Keypair::generate();
    let mut executor = bootstrapped(&owner);

    let transfer = sign(&user, Call::Transfer { to: owner.address(), amount: 50 });
    assert!(matches!(
        executor.submit(&transfer),
        Err(ExecutorError::Ledger(LedgerError::InsufficientBalance { .. }))
    ));
    assert!(!executor.state().has_executed(&transfer.id()));

    executor
        .submit(&sign(&owner, Call::Mint { minter: m1(), amount: 50, to: user.address() }))
        .expect("fund user");
    executor.submit(&transfer).expect("retry succeeds");
    assert_eq!(executor.ledger().balance_of(&owner.address()), 50);
}

/// Test: Bad signatures never reach the ledger
#[test]
fn test_invalid_signature_rejected() {
    let owner = Keypair::generate();
    let mut executor = bootstrapped(&owner);

    let honest = sign(&owner, Call::Pause);
    let forged = SignedCall::from_parts(honest.envelope().clone(), Keypair::generate().sign(b"pause"));

    assert_eq!(
        executor.submit(&forged).err(),
        Some(ExecutorError::Validation(ValidationError::InvalidSignature))
    );
    assert!(!executor.ledger().is_paused());
}

/// Test: A transfer stays unreplayable however many calls follow it
#[test]
fn test_replay_after_full_window_still_rejected() {
    let owner = Keypair::generate();
    let bob = Keypair::generate().address();
    let config = LedgerConfig::default().with_max_tracked_calls(5);
    let mut executor = Executor::new(&config);

    for call in [
        Call::Initialize { name: "WUSD".into(), symbol: "wusd".into() },
        Call::RegisterMinter { minter: m1() },
        Call::Mint { minter: m1(), amount: 1_000, to: Address::ZERO },
    ] {
        executor.submit(&sign(&owner, call)).expect("setup");
    }
    let pay = sign(&owner, Call::Transfer { to: bob, amount: 100 });
    executor.submit(&pay).expect("pay");
    executor.submit(&sign(&owner, Call::Unpause)).expect("unpause");

    // Every tracked id is still inside the age window, so nothing is forgotten
    assert_eq!(
        executor.submit(&sign(&owner, Call::Unpause)).err(),
        Some(ExecutorError::ReplayWindowFull { capacity: 5 })
    );
    assert_eq!(executor.submit(&pay).err(), Some(ExecutorError::DuplicateCall(pay.id())));
    assert_eq!(executor.ledger().balance_of(&bob), 100);
    assert_eq!(executor.state().executed_count(), 5);
}

// ============================================================================
// STATE
// ============================================================================

/// Test: Persisted state restores balances, registry lookups and the replay set
#[test]
fn test_state_roundtrip_restores_indexes() {
    let owner = Keypair::generate();
    let mut executor = bootstrapped(&owner);
    let mint = sign(&owner, Call::Mint { minter: m1(), amount: 77, to: Address::ZERO });
    executor.submit(&mint).expect("mint");

    let bytes = executor.state().to_bytes().expect("encode state");
    let restored = LedgerState::from_bytes(&bytes).expect("decode state");

    assert!(restored.has_executed(&mint.id()));
    assert!(restored.ledger().is_registered(&m1()));
    assert_eq!(restored.ledger().balance_of(&owner.address()), 77);
    restored.ledger().check_invariants().expect("invariants");

    let mut resumed = Executor::with_state(restored, &LedgerConfig::default());
    assert_eq!(resumed.submit(&mint).err(), Some(ExecutorError::DuplicateCall(mint.id())));
    assert!(matches!(
        resumed.submit(&sign(&owner, Call::RegisterMinter { minter: m1() })),
        Err(ExecutorError::Ledger(LedgerError::AlreadyRegistered(_)))
    ));
}

/// Test: Dispatch routes calls to the matching ledger operation
#[test]
fn test_dispatch_routes_calls() {
    let owner = Address::from_bytes([1; 20]);
    let mut ledger = TokenLedger::new();

    dispatch(&mut ledger, &owner, &Call::Initialize { name: "WUSD".into(), symbol: "wusd".into() })
        .expect("initialize");
    dispatch(&mut ledger, &owner, &Call::UpgradeTo { logic_version: 2 }).expect("upgrade");
    dispatch(&mut ledger, &owner, &Call::Pause).expect("pause");

    assert_eq!(ledger.logic_version(), 2);
    assert!(ledger.is_paused());
    assert_eq!(
        dispatch(&mut ledger, &owner, &Call::Approve { spender: Address::from_bytes([2; 20]), amount: 1 }),
        Err(LedgerError::Paused)
    );
}
