use crate::access::PauseGate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pausable {
    paused: bool,
}

impl Pausable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag; returns whether it changed
    pub fn pause(&mut self) -> bool {
        !std::mem::replace(&mut self.paused, true)
    }

    /// Clear the flag; returns whether it changed
    pub fn unpause(&mut self) -> bool {
        std::mem::replace(&mut self.paused, false)
    }
}

impl PauseGate for Pausable {
    fn is_paused(&self) -> bool {
        self.paused
    }
}
