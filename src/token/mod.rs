// Token module - THE PROVENANCE LEDGER
// Minter registry, per-account provenance buckets, mint/burn and FIFO transfers

mod account;
mod allowance;
mod error;
mod events;
mod ledger;
mod minter;
mod transfer;

/// Token quantity in base units (6 decimals)
pub type Amount = u128;

pub use account::{Account, AccountLedger, ProvenanceBucket};
pub use allowance::{AllowanceSpend, Allowances, UNLIMITED_ALLOWANCE};
pub use error::LedgerError;
pub use events::LedgerEvent;
pub use ledger::{TokenLedger, TokenMetadata, DECIMALS, LAYOUT_VERSION};
pub use minter::{MinterId, MinterIdError, MinterRecord, MinterRegistry};
pub use transfer::{plan_transfer, TransferPlan};
