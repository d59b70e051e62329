// Storage module - PERSISTENCE
// Keeps the ledger state, signing identities and host config in sled

mod store;

pub use store::{LedgerStore, StorageStats, StoreError};
