use crate::support::Fixture;
use provledger::identity::Address;
use provledger::token::{LedgerError, LedgerEvent, MinterId};

/// Paused fixture: owner holds 1,000, user1 may spend 500 of it
fn paused() -> Fixture {
    let mut fx = Fixture::new();
    let (owner, user1) = (fx.owner, fx.user1);
    fx.mint_to_owner(fx.m1, 1_000);
    fx.ledger.approve(&owner, &user1, 500).expect("approve");
    fx.ledger.pause(&owner).expect("pause");
    fx.ledger.take_events();
    fx
}

/// Test: Pause and unpause emit events once per state change
#[test]
fn test_pause_and_unpause() {
    let mut fx = Fixture::new();
    let owner = fx.owner;

    fx.ledger.pause(&owner).expect("pause");
    assert!(fx.ledger.is_paused());
    fx.ledger.pause(&owner).expect("pause is idempotent");
    assert_eq!(fx.ledger.take_events(), vec![LedgerEvent::Paused { by: owner }]);

    fx.ledger.unpause(&owner).expect("unpause");
    fx.ledger.unpause(&owner).expect("unpause is idempotent");
    assert!(!fx.ledger.is_paused());
    assert_eq!(fx.ledger.take_events(), vec![LedgerEvent::Unpaused { by: owner }]);
}

/// Test: Only the owner toggles the pause
#[test]
fn test_pause_requires_owner() {
    let mut fx = Fixture::new();
    let user1 = fx.user1;

    assert_eq!(fx.ledger.pause(&user1), Err(LedgerError::Unauthorized));
    assert!(!fx.ledger.is_paused());

    let owner = fx.owner;
    fx.ledger.pause(&owner).expect("pause");
    assert_eq!(fx.ledger.unpause(&user1), Err(LedgerError::Unauthorized));
    assert!(fx.ledger.is_paused());
}

/// Test: Every value-moving operation fails with Paused
#[test]
fn test_mutations_blocked_while_paused() {
    let mut fx = paused();
    let (owner, user1, user2, m1) = (fx.owner, fx.user1, fx.user2, fx.m1);
    let m3 = MinterId::from_label("minter3").expect("label");

    assert_eq!(fx.ledger.register_minter(&owner, &m3), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.mint(&owner, &m1, 1, &Address::ZERO), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.burn(&owner, &m1, 1), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.transfer(&owner, &user2, 1), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.transfer_from(&user1, &owner, &user2, 1), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.approve(&owner, &user2, 1), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.increase_allowance(&owner, &user1, 1), Err(LedgerError::Paused));
    assert_eq!(fx.ledger.decrease_allowance(&owner, &user1, 1), Err(LedgerError::Paused));

    assert!(fx.ledger.take_events().is_empty());
}

/// Test: The pause check comes before the owner check
#[test]
fn test_paused_beats_unauthorized() {
    let mut fx = paused();
    let (user1, m1) = (fx.user1, fx.m1);
    assert_eq!(fx.ledger.mint(&user1, &m1, 1, &Address::ZERO), Err(LedgerError::Paused));
}

/// Test: Reads keep working while paused
#[test]
fn test_reads_while_paused() {
    let fx = paused();

    assert_eq!(fx.ledger.balance_of(&fx.owner), 1_000);
    assert_eq!(fx.ledger.balance_of_minter(&fx.owner, &fx.m1), 1_000);
    assert_eq!(fx.ledger.total_supply(), 1_000);
    assert_eq!(fx.ledger.total_balances_of_minter(&fx.m1), 1_000);
    assert_eq!(fx.ledger.allowance(&fx.owner, &fx.user1), 500);
    assert!(fx.ledger.is_registered(&fx.m1));
    assert_eq!(fx.ledger.name(), "WUSD");
}

/// Test: After unpausing everything works again
#[test]
fn test_unpause_restores_operations() {
    let mut fx = paused();
    let (owner, user1, user2) = (fx.owner, fx.user1, fx.user2);
    fx.ledger.unpause(&owner).expect("unpause");

    fx.ledger.transfer(&owner, &user2, 100).expect("transfer");
    fx.ledger.transfer_from(&user1, &owner, &user2, 100).expect("transfer_from");
    assert_eq!(fx.ledger.balance_of(&user2), 200);
    assert_eq!(fx.ledger.allowance(&owner, &user1), 400);
}

/// Test: Ownership handover and upgrades are not pause-gated
#[test]
fn test_owner_admin_while_paused() {
    let mut fx = paused();
    let (owner, user1) = (fx.owner, fx.user1);

    fx.ledger.upgrade_to(&owner, 2).expect("upgrade while paused");
    fx.ledger.transfer_ownership(&owner, &user1).expect("hand over while paused");
    fx.ledger.unpause(&user1).expect("new owner unpauses");
    assert!(!fx.ledger.is_paused());
}
