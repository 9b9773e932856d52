pub mod message;
pub mod space;
pub mod state;

pub use message::{Message, MessageGenerator, MessagePolicy};
pub use space::{Distribution, StateSpace};
pub use state::{State, StateId};
