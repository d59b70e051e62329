use crate::call::{unix_now, Call, CallEnvelope, SignedCall};
use crate::identity::{Keypair, Signer};
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Missing signer: caller keypair is required")]
    MissingSigner,

    #[error("Missing call: an operation is required")]
    MissingCall,
}

/// Builder for signed calls
pub struct CallBuilder<'a> {
    signer: Option<&'a Keypair>,
    call: Option<Call>,
    nonce: Option<u64>,
    timestamp: Option<u64>,
}

impl<'a> CallBuilder<'a> {
    pub fn new() -> Self {
        Self {
            signer: None,
            call: None,
            nonce: None,
            timestamp: None,
        }
    }

    /// Set the caller's keypair (required)
    pub fn signer(mut self, keypair: &'a Keypair) -> Self {
        self.signer = Some(keypair);
        self
    }

    /// Set the operation (required)
    pub fn call(mut self, call: Call) -> Self {
        self.call = Some(call);
        self
    }

    /// Set the nonce (random if not provided)
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the timestamp (now if not provided)
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build and sign the call
    pub fn build(self) -> Result<SignedCall, CallError> {
        let keypair = self.signer.ok_or(CallError::MissingSigner)?;
        let call = self.call.ok_or(CallError::MissingCall)?;

        let nonce = self.nonce.unwrap_or_else(|| rand::thread_rng().gen::<u64>());
        let timestamp = self.timestamp.unwrap_or_else(unix_now);

        let envelope = CallEnvelope::new(keypair.public_key(), call, nonce, timestamp);
        let signature = Signer::sign(keypair, &envelope.to_signing_bytes());

        Ok(SignedCall::from_parts(envelope, signature))
    }
}

impl<'a> Default for CallBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
