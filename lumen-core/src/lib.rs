//! Board-agnostic bring-up logic for the Lumen display firmware
//!
//! This crate contains everything about bringing the panel up that does
//! not depend on a specific chip:
//!
//! - Configuration types with the reference board's values
//! - The bring-up state machine
//! - The bring-up choreography itself ([`run_bringup`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bringup;
pub mod config;
pub mod state;

pub use bringup::{run_bringup, Bringup};
pub use config::{BringupConfig, PacingConfig};
pub use state::{ErrorKind, Event, State};
