//! STM32F4 support for the Lumen firmware
//!
//! Drivers for the pieces of an STM32F4 the display bring-up touches,
//! written against the `stm32-metapac` register blocks:
//!
//! - [`i2c`] - the polled I2C master engine
//! - [`gpio`] - the indicator output
//! - [`setup`] - one-time clock gating and pin muxing
//!
//! # Features
//!
//! - `stm32f411ce` - Register layout for the STM32F411CE (default)
//! - `defmt` - Enable debug formatting support
//! - `std` - Build the host-side register simulator ([`sim`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod gpio;
pub mod i2c;
pub mod setup;

#[cfg(any(test, feature = "std"))]
pub mod sim;

/// Peripheral access crate
pub use stm32_metapac as pac;

pub use gpio::Indicator;
pub use i2c::{BusTiming, EngineConfig, I2cError, I2cMaster, I2cRegisters};
