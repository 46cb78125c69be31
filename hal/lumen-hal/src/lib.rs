//! Lumen Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs, plus the few chip-independent primitives every
//! driver in the workspace leans on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (bring-up choreography)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-display (SSD1306 framer/session) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal-stm32f4 (register engine)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits and primitives
//!
//! - [`i2c::I2cBus`] - Addressed I2C writes
//! - [`gpio::OutputPin`] - Digital output (status indicator)
//! - [`delay::DelayCycles`] - Busy-wait bus timing primitive
//! - [`poll::PollBudget`] - Bounded or unbounded status polling
//! - [`shared::SharedBus`] - Whole-transaction mutual exclusion

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod delay;
pub mod gpio;
pub mod i2c;
pub mod poll;
pub mod shared;

// Re-export key traits at crate root for convenience
pub use delay::{DelayCycles, SpinDelay};
pub use gpio::OutputPin;
pub use i2c::{I2cBus, Transaction};
pub use poll::{Exhausted, PollBudget};
pub use shared::SharedBus;
