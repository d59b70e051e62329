use crate::identity::{Address, PublicKey, Signature, Signer};
use crate::token::{Amount, MinterId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Domain tag prepended to every signed payload
const CALL_DOMAIN: &[u8] = b"provledger:call:v1";

/// Unique identifier for a call (SHA256 of its signing bytes)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId([u8; 32]);

impl CallId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call:{}", hex::encode(&self.0[..8]))
    }
}

/// A mutating ledger operation; the caller is implied by the signature
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Initialize { name: String, symbol: String },
    RegisterMinter { minter: MinterId },
    Mint { minter: MinterId, amount: Amount, to: Address },
    Burn { minter: MinterId, amount: Amount },
    Transfer { to: Address, amount: Amount },
    TransferFrom { from: Address, to: Address, amount: Amount },
    Approve { spender: Address, amount: Amount },
    IncreaseAllowance { spender: Address, added: Amount },
    DecreaseAllowance { spender: Address, subtracted: Amount },
    Pause,
    Unpause,
    TransferOwnership { new_owner: Address },
    UpgradeTo { logic_version: u32 },
}

impl Call {
    /// Short operation name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Call::Initialize { .. } => "initialize",
            Call::RegisterMinter { .. } => "register_minter",
            Call::Mint { .. } => "mint",
            Call::Burn { .. } => "burn",
            Call::Transfer { .. } => "transfer",
            Call::TransferFrom { .. } => "transfer_from",
            Call::Approve { .. } => "approve",
            Call::IncreaseAllowance { .. } => "increase_allowance",
            Call::DecreaseAllowance { .. } => "decrease_allowance",
            Call::Pause => "pause",
            Call::Unpause => "unpause",
            Call::TransferOwnership { .. } => "transfer_ownership",
            Call::UpgradeTo { .. } => "upgrade_to",
        }
    }
}

/// Unsigned call: what the caller asks for, plus replay-distinguishing fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelope {
    caller: PublicKey,
    call: Call,
    nonce: u64,
    timestamp: u64,
}

impl CallEnvelope {
    pub fn new(caller: PublicKey, call: Call, nonce: u64, timestamp: u64) -> Self {
        Self {
            caller,
            call,
            nonce,
            timestamp,
        }
    }

    pub fn caller(&self) -> &PublicKey {
        &self.caller
    }

    /// Ledger address of the caller
    pub fn caller_address(&self) -> Address {
        self.caller.address()
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn id(&self) -> CallId {
        let hash = Sha256::digest(self.to_signing_bytes());
        let mut id = [0u8; 32];
        id.copy_from_slice(&hash);
        CallId(id)
    }

    /// Deterministic bytes covered by the signature
    pub fn to_signing_bytes(&self) -> Vec<u8> {
        // Every Call field is a fixed-size value or a String, and the alloc
        // flavor has no size limit, so encoding into a Vec cannot fail
        let call = postcard::to_allocvec(&self.call).unwrap_or_default();

        let mut bytes = Vec::with_capacity(CALL_DOMAIN.len() + 32 + call.len() + 20);
        bytes.extend_from_slice(CALL_DOMAIN);
        bytes.extend_from_slice(self.caller.as_bytes());
        bytes.extend_from_slice(&(call.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&call);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes
    }
}

/// A call together with the caller's signature over it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    envelope: CallEnvelope,
    signature: Signature,
}

impl SignedCall {
    pub fn from_parts(envelope: CallEnvelope, signature: Signature) -> Self {
        Self { envelope, signature }
    }

    pub fn envelope(&self) -> &CallEnvelope {
        &self.envelope
    }

    pub fn call(&self) -> &Call {
        self.envelope.call()
    }

    pub fn caller_address(&self) -> Address {
        self.envelope.caller_address()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn id(&self) -> CallId {
        self.envelope.id()
    }

    /// Check the signature against the embedded caller key
    pub fn verify(&self) -> bool {
        Signer::verify(
            self.envelope.caller(),
            &self.envelope.to_signing_bytes(),
            &self.signature,
        )
    }
}
