//! provledger - a fungible token ledger that remembers who minted every unit.
//!
//! Several minters issue into one token. Holders transfer freely, and the
//! ledger keeps each balance split by minter so burns can be scoped to one
//! minter's issuance. Transfers drain the sender's oldest provenance first.

// Identity: keypairs, signatures, addresses
pub mod identity;

// Owner and pause gates
pub mod access;

// The provenance ledger itself
pub mod token;

// Signed call envelope
pub mod call;

// Executor and single-writer service
pub mod host;

// sled persistence
pub mod storage;
