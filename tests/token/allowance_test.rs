use crate::support::Fixture;
use provledger::identity::Address;
use provledger::token::{LedgerError, LedgerEvent, UNLIMITED_ALLOWANCE};

/// Funded fixture: owner holds 1,000 of minter1 and user1 is the spender
fn funded() -> Fixture {
    let mut fx = Fixture::new();
    fx.mint_to_owner(fx.m1, 1_000);
    fx.ledger.take_events();
    fx
}

// ============================================================================
// APPROVE / INCREASE / DECREASE
// ============================================================================

/// Test: Approve sets and overwrites the allowance
#[test]
fn test_approve() {
    let mut fx = funded();
    let (owner, user1) = (fx.owner, fx.user1);

    assert_eq!(fx.ledger.allowance(&owner, &user1), 0);
    fx.ledger.approve(&owner, &user1, 300).expect("approve");
    assert_eq!(fx.ledger.allowance(&owner, &user1), 300);
    fx.ledger.approve(&owner, &user1, 50).expect("re-approve");
    assert_eq!(fx.ledger.allowance(&owner, &user1), 50);

    let events = fx.ledger.take_events();
    assert_eq!(
        events.last(),
        Some(&LedgerEvent::Approval {
            owner,
            spender: user1,
            amount: 50,
        })
    );
}

/// Test: Approving the zero spender is refused
#[test]
fn test_approve_zero_spender() {
    let mut fx = funded();
    let owner = fx.owner;
    assert_eq!(fx.ledger.approve(&owner, &Address::ZERO, 1), Err(LedgerError::ZeroAddress));
}

/// Test: Increase and decrease move the allowance relative to its value
#[test]
fn test_increase_and_decrease_allowance() {
    let mut fx = funded();
    let (owner, user1) = (fx.owner, fx.user1);

    fx.ledger.increase_allowance(&owner, &user1, 100).expect("increase");
    fx.ledger.increase_allowance(&owner, &user1, 50).expect("increase");
    assert_eq!(fx.ledger.allowance(&owner, &user1), 150);

    fx.ledger.decrease_allowance(&owner, &user1, 120).expect("decrease");
    assert_eq!(fx.ledger.allowance(&owner, &user1), 30);
}

/// Test: Decreasing below zero is refused with a readable message
#[test]
fn test_decrease_allowance_below_zero() {
    let mut fx = funded();
    let (owner, user1) = (fx.owner, fx.user1);
    fx.ledger.approve(&owner, &user1, 10).expect("approve");

    let result = fx.ledger.decrease_allowance(&owner, &user1, 11);
    assert_eq!(result, Err(LedgerError::AllowanceBelowZero));
    assert_eq!(result.unwrap_err().to_string(), "decreased allowance below zero");
    assert_eq!(fx.ledger.allowance(&owner, &user1), 10);
}

/// Test: Increasing past the maximum overflows
#[test]
fn test_increase_allowance_overflow() {
    let mut fx = funded();
    let (owner, user1) = (fx.owner, fx.user1);
    fx.ledger.approve(&owner, &user1, UNLIMITED_ALLOWANCE).expect("approve");

    assert_eq!(fx.ledger.increase_allowance(&owner, &user1, 1), Err(LedgerError::Overflow));
    assert_eq!(fx.ledger.allowance(&owner, &user1), UNLIMITED_ALLOWANCE);
}

// ============================================================================
// TRANSFER FROM
// ============================================================================

/// Test: A spender moves funds and the allowance goes down by the amount
#[test]
fn test_transfer_from_consumes_allowance() {
    let mut fx = funded();
    let (owner, user1, user2, m1) = (fx.owner, fx.user1, fx.user2, fx.m1);
    fx.ledger.approve(&owner, &user1, 600).expect("approve");

    fx.ledger.transfer_from(&user1, &owner, &user2, 400).expect("transfer_from");

    assert_eq!(fx.ledger.allowance(&owner, &user1), 200);
    assert_eq!(fx.ledger.balance_of(&owner), 600);
    assert_eq!(fx.ledger.balance_of_minter(&user2, &m1), 400);
    assert_eq!(fx.ledger.balance_of(&user1), 0, "The spender never holds the funds");
}

/// Test: The unlimited sentinel is never decremented
#[test]
fn test_transfer_from_unlimited_allowance() {
    let mut fx = funded();
    let (owner, user1, user2) = (fx.owner, fx.user1, fx.user2);
    fx.ledger.approve(&owner, &user1, UNLIMITED_ALLOWANCE).expect("approve");

    fx.ledger.transfer_from(&user1, &owner, &user2, 300).expect("first");
    fx.ledger.transfer_from(&user1, &owner, &user2, 700).expect("second");

    assert_eq!(fx.ledger.allowance(&owner, &user1), UNLIMITED_ALLOWANCE);
    assert_eq!(fx.ledger.balance_of(&user2), 1_000);
    assert_eq!(fx.ledger.balance_of(&owner), 0);
}

/// Test: Spending more than allowed is refused and nothing moves
#[test]
fn test_transfer_from_insufficient_allowance() {
    let mut fx = funded();
    let (owner, user1, user2) = (fx.owner, fx.user1, fx.user2);
    fx.ledger.approve(&owner, &user1, 100).expect("approve");
    fx.ledger.take_events();

    assert_eq!(
        fx.ledger.transfer_from(&user1, &owner, &user2, 101),
        Err(LedgerError::InsufficientAllowance {
            available: 100,
            required: 101,
        })
    );
    assert_eq!(fx.ledger.allowance(&owner, &user1), 100);
    assert_eq!(fx.ledger.balance_of(&owner), 1_000);
    assert!(fx.ledger.take_events().is_empty());
}

/// Test: Allowance is checked before balance; a balance failure keeps the allowance
#[test]
fn test_transfer_from_check_order() {
    let mut fx = funded();
    let (owner, user1, user2) = (fx.owner, fx.user1, fx.user2);
    fx.ledger.approve(&owner, &user1, 2_000).expect("approve");

    assert_eq!(
        fx.ledger.transfer_from(&user1, &owner, &user2, 3_000),
        Err(LedgerError::InsufficientAllowance {
            available: 2_000,
            required: 3_000,
        })
    );
    assert_eq!(
        fx.ledger.transfer_from(&user1, &owner, &user2, 1_500),
        Err(LedgerError::InsufficientBalance {
            available: 1_000,
            required: 1_500,
        })
    );
    assert_eq!(fx.ledger.allowance(&owner, &user1), 2_000);
}

/// Test: Zero amounts and zero recipients are refused for delegated transfers too
#[test]
fn test_transfer_from_zero_cases() {
    let mut fx = funded();
    let (owner, user1, user2) = (fx.owner, fx.user1, fx.user2);
    fx.ledger.approve(&owner, &user1, 10).expect("approve");

    assert_eq!(fx.ledger.transfer_from(&user1, &owner, &user2, 0), Err(LedgerError::ZeroAmount));
    assert_eq!(
        fx.ledger.transfer_from(&user1, &owner, &Address::ZERO, 5),
        Err(LedgerError::ZeroAddress)
    );
    assert_eq!(fx.ledger.allowance(&owner, &user1), 10);
}
