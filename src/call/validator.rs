use crate::call::{unix_now, CallEnvelope, SignedCall};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid signature: signature does not match the call content")]
    InvalidSignature,

    #[error("Future timestamp: call timestamp is too far in the future")]
    FutureTimestamp,

    #[error("Expired: call is older than the accepted window")]
    Expired,
}

/// Validator for signed calls
pub struct CallValidator;

impl CallValidator {
    /// Check the signature against the embedded caller key
    pub fn validate(signed: &SignedCall) -> Result<&CallEnvelope, ValidationError> {
        if !signed.verify() {
            return Err(ValidationError::InvalidSignature);
        }
        Ok(signed.envelope())
    }

    /// Signature check plus a clock-skew and age window
    ///
    /// `max_age_secs == 0` disables the expiry check.
    pub fn validate_full(
        signed: &SignedCall,
        future_tolerance_secs: u64,
        max_age_secs: u64,
    ) -> Result<&CallEnvelope, ValidationError> {
        let envelope = Self::validate(signed)?;
        let now = unix_now();

        if envelope.timestamp() > now.saturating_add(future_tolerance_secs) {
            return Err(ValidationError::FutureTimestamp);
        }
        if max_age_secs > 0 && envelope.timestamp().saturating_add(max_age_secs) < now {
            return Err(ValidationError::Expired);
        }
        Ok(envelope)
    }
}
