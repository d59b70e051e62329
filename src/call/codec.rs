use crate::call::SignedCall;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode call: {0}")]
    EncodeError(String),

    #[error("Failed to decode call: {0}")]
    DecodeError(String),

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid base64 string: {0}")]
    InvalidBase64(String),
}

/// Wire forms of a signed call
pub struct CallCodec;

impl CallCodec {
    /// Compact binary form (postcard)
    pub fn encode(signed: &SignedCall) -> Result<Vec<u8>, CodecError> {
        postcard::to_allocvec(signed).map_err(|e| CodecError::EncodeError(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<SignedCall, CodecError> {
        postcard::from_bytes(bytes).map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    pub fn encode_hex(signed: &SignedCall) -> Result<String, CodecError> {
        Self::encode(signed).map(hex::encode)
    }

    pub fn decode_hex(hex_str: &str) -> Result<SignedCall, CodecError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// URL-safe base64 without padding
    pub fn encode_base64(signed: &SignedCall) -> Result<String, CodecError> {
        Self::encode(signed).map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn decode_base64(b64_str: &str) -> Result<SignedCall, CodecError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(b64_str.trim())
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        Self::decode(&bytes)
    }
}
