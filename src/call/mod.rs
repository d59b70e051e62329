// Call module - the signed transaction envelope submitted to the host

mod builder;
mod codec;
mod model;
mod validator;

pub use builder::*;
pub use codec::*;
pub use model::*;
pub use validator::*;

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch (0 if the clock is before it)
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
