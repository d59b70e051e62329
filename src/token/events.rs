use crate::identity::Address;
use crate::token::{Amount, MinterId, ProvenanceBucket};
use serde::{Deserialize, Serialize};

/// Notifications emitted by committed ledger operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Initialized {
        owner: Address,
        name: String,
        symbol: String,
    },
    MinterAdded {
        minter: MinterId,
    },
    Minted {
        minter: MinterId,
        to: Address,
        amount: Amount,
    },
    Burned {
        minter: MinterId,
        from: Address,
        amount: Amount,
    },
    /// Value movement; mint comes from and burn goes to the zero address.
    /// `provenance` is the per-minter split that moved, in FIFO order.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
        provenance: Vec<ProvenanceBucket>,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    Upgraded {
        from_version: u32,
        to_version: u32,
    },
}
