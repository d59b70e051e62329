// Identity module - who is calling the ledger
// Ed25519 keypairs, call signatures and 20-byte account addresses

mod address;
mod keypair;
mod signer;

pub use address::*;
pub use keypair::*;
pub use signer::*;
