use core::fmt;
use core::num::NonZeroU32;
use serde::{Deserialize, Serialize};

/// Identifier of a real state. Ids start at 1; there is no reserved "empty" id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(NonZeroU32);

impl StateId {
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// One possible value of the hidden quantity, with its probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub probability: f64,
}

impl State {
    pub const fn new(id: StateId, probability: f64) -> Self {
        Self { id, probability }
    }
}
