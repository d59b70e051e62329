// Shared fixtures for ledger tests

use provledger::identity::Address;
use provledger::token::{Amount, MinterId, TokenLedger};

pub const NAME: &str = "WUSD";
pub const SYMBOL: &str = "wusd";

pub fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

pub fn minter(label: &str) -> MinterId {
    MinterId::from_label(label).expect("valid minter label")
}

/// An initialized ledger with two registered minters and three parties
pub struct Fixture {
    pub ledger: TokenLedger,
    pub owner: Address,
    pub user1: Address,
    pub user2: Address,
    pub m1: MinterId,
    pub m2: MinterId,
}

impl Fixture {
    pub fn new() -> Self {
        let owner = addr(1);
        let m1 = minter("minter1");
        let m2 = minter("minter2");

        let mut ledger = TokenLedger::new();
        ledger.initialize(&owner, NAME, SYMBOL).expect("initialize");
        ledger.register_minter(&owner, &m1).expect("register m1");
        ledger.register_minter(&owner, &m2).expect("register m2");
        ledger.take_events();

        Self {
            ledger,
            owner,
            user1: addr(2),
            user2: addr(3),
            m1,
            m2,
        }
    }

    pub fn mint_to_owner(&mut self, m: MinterId, amount: Amount) {
        self.ledger
            .mint(&self.owner, &m, amount, &Address::ZERO)
            .expect("mint to owner");
    }

    pub fn buckets(&self, account: &Address) -> Vec<(MinterId, Amount)> {
        self.ledger
            .buckets(account)
            .iter()
            .map(|b| (*b.minter(), b.amount()))
            .collect()
    }
}
