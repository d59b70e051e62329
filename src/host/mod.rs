// Host module - THE TRANSACTION SEQUENCER
// Authenticates signed calls, orders them and applies them to the ledger

mod config;
mod executor;
mod service;

pub use config::{ConfigError, LedgerConfig};
pub use executor::{dispatch, Executor, ExecutorError, LedgerState, Receipt};
pub use service::{CommitSink, LedgerHandle, LedgerService, NullSink, ServiceError};
