//! Bring-up state machine
//!
//! Explicit, finite and deterministic. The firmware only ever moves
//! forward through it; any fault lands in a terminal error state.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ErrorKind, State};
