//! SSD1306 display support for Lumen
//!
//! This crate provides:
//! - [`command`] - the controller's opcode table and fixed init sequence
//! - [`Framer`] - command/data framing over any [`I2cBus`](lumen_hal::I2cBus)
//! - [`DisplaySession`] - typestate session: initialize, fill, clear
//! - [`sim`] - a controller model with display RAM (`std` feature)
//!
//! # Framing
//!
//! Every transfer is two bytes: a control byte followed by one payload
//! byte. `0x00` marks the payload as a command, `0x40` as display RAM data.
//!
//! # Session states
//!
//! ```text
//! Uninitialized --initialize()--> Configured --fill()/send_data()/clear()
//!                                     ^                  |
//!                                     +--reinitialize()--+
//! ```
//!
//! Pixel data can only be sent from a `Configured` session, so data never
//! reaches the controller before horizontal addressing mode is set.

#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod command;
pub mod error;
pub mod framer;
pub mod session;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use command::{COLUMNS, DEFAULT_ADDRESS, INIT_SEQUENCE, PAGES};
pub use error::DisplayError;
pub use framer::{Framer, SettleTiming};
pub use session::{Configured, DisplaySession, Uninitialized};
