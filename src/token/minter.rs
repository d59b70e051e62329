// Minter registry - which issuers exist and how much each has outstanding

use crate::token::{Amount, LedgerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINTER_ID_LEN: usize = 32;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MinterIdError {
    #[error("Minter label too long: {0} bytes, at most 31 allowed")]
    LabelTooLong(usize),

    #[error("Invalid minter hex: {0}")]
    InvalidHex(String),
}

/// Opaque 32-byte minter identifier
///
/// Human-readable minters are short ASCII labels right-padded with zero bytes.
/// The all-zero identifier is the empty sentinel and is never registrable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinterId([u8; MINTER_ID_LEN]);

impl MinterId {
    pub const ZERO: MinterId = MinterId([0u8; MINTER_ID_LEN]);

    pub fn from_bytes(bytes: [u8; MINTER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Encode a label as a zero-padded identifier
    pub fn from_label(label: &str) -> Result<Self, MinterIdError> {
        let raw = label.as_bytes();
        // One trailing zero byte is always kept so the label stays terminated
        if raw.len() >= MINTER_ID_LEN {
            return Err(MinterIdError::LabelTooLong(raw.len()));
        }
        let mut bytes = [0u8; MINTER_ID_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Parse either `0x` + 64 hex digits or a short label
    pub fn parse(s: &str) -> Result<Self, MinterIdError> {
        match s.strip_prefix("0x") {
            Some(digits) if digits.len() == MINTER_ID_LEN * 2 => {
                let raw = hex::decode(digits).map_err(|e| MinterIdError::InvalidHex(e.to_string()))?;
                let mut bytes = [0u8; MINTER_ID_LEN];
                bytes.copy_from_slice(&raw);
                Ok(Self(bytes))
            }
            _ => Self::from_label(s),
        }
    }

    pub fn as_bytes(&self) -> &[u8; MINTER_ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// The label, if the identifier is printable ASCII followed only by zero padding
    pub fn label(&self) -> Option<&str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(MINTER_ID_LEN);
        if end == 0 || self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        let label = &self.0[..end];
        if !label.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return None;
        }
        std::str::from_utf8(label).ok()
    }
}

impl FromStr for MinterId {
    type Err = MinterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MinterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for MinterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MinterId({})", self)
    }
}

/// Registry entry for one minter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinterRecord {
    id: MinterId,
    registered: bool,
    total_issued: Amount,
}

impl MinterRecord {
    pub fn id(&self) -> &MinterId {
        &self.id
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Outstanding issuance: minted minus burned
    pub fn total_issued(&self) -> Amount {
        self.total_issued
    }
}

/// Append-only registry of minters
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MinterRegistry {
    /// Records in registration order
    records: Vec<MinterRecord>,
    /// Index: minter -> position in `records`
    #[serde(skip)]
    index: HashMap<MinterId, usize>,
}

impl MinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new minter with zero issuance
    pub fn register(&mut self, id: MinterId) -> Result<(), LedgerError> {
        if id.is_zero() {
            return Err(LedgerError::InvalidMinter);
        }
        if self.index.contains_key(&id) {
            return Err(LedgerError::AlreadyRegistered(id));
        }

        self.index.insert(id, self.records.len());
        self.records.push(MinterRecord {
            id,
            registered: true,
            total_issued: 0,
        });
        Ok(())
    }

    pub fn is_registered(&self, id: &MinterId) -> bool {
        self.record(id).map(|r| r.registered).unwrap_or(false)
    }

    /// Outstanding issuance of a minter; zero for unknown minters
    pub fn total_issued(&self, id: &MinterId) -> Amount {
        self.record(id).map(|r| r.total_issued).unwrap_or(0)
    }

    pub fn record(&self, id: &MinterId) -> Option<&MinterRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// All records in registration order
    pub fn records(&self) -> &[MinterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every minter's outstanding issuance
    pub fn total_outstanding(&self) -> Option<Amount> {
        self.records
            .iter()
            .try_fold(0 as Amount, |acc, r| acc.checked_add(r.total_issued))
    }

    /// Issuance after adding `amount`, without applying it
    pub(crate) fn issued_after_mint(&self, id: &MinterId, amount: Amount) -> Result<Amount, LedgerError> {
        let record = self.record(id).ok_or(LedgerError::UnknownMinter(*id))?;
        record.total_issued.checked_add(amount).ok_or(LedgerError::Overflow)
    }

    /// Issuance after removing `amount`, without applying it
    pub(crate) fn issued_after_burn(&self, id: &MinterId, amount: Amount) -> Result<Amount, LedgerError> {
        let record = self.record(id).ok_or(LedgerError::UnknownMinter(*id))?;
        record.total_issued.checked_sub(amount).ok_or_else(|| {
            LedgerError::InvariantViolation(format!(
                "burn of {} exceeds outstanding issuance {} of {}",
                amount, record.total_issued, id
            ))
        })
    }

    /// Commit a value computed by `issued_after_mint` / `issued_after_burn`
    pub(crate) fn set_total_issued(&mut self, id: &MinterId, total: Amount) {
        if let Some(&i) = self.index.get(id) {
            self.records[i].total_issued = total;
        }
    }

    /// Rebuild the lookup index (after deserialization)
    pub(crate) fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
    }
}
