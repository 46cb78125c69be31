//! Configuration types
//!
//! Defaults are the reference board's values. The firmware builds these
//! from `board.toml` at compile time.

use lumen_display::{SettleTiming, DEFAULT_ADDRESS};
use lumen_hal::i2c::MAX_ADDRESS;

use crate::state::ErrorKind;

/// Busy-wait pacing, in delay cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacingConfig {
    /// After each command transfer
    pub command_settle: u32,
    /// After each data transfer
    pub data_settle: u32,
    /// After each byte inside a transfer
    pub byte_pacing: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl PacingConfig {
    /// 100 cycles after commands, 10 after data, 10 per byte
    pub const REFERENCE: Self = Self {
        command_settle: 100,
        data_settle: 10,
        byte_pacing: 10,
    };

    /// Settling delays for the display framer
    pub const fn settle_timing(&self) -> SettleTiming {
        SettleTiming {
            command: self.command_settle,
            data: self.data_settle,
        }
    }
}

/// Everything the bring-up needs to know about the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringupConfig {
    /// 7-bit display address
    pub address: u8,
    /// Wait before touching the bus, in delay cycles
    pub startup_delay_cycles: u32,
    /// Settling and per-byte pacing
    pub pacing: PacingConfig,
    /// Byte written once the panel is cleared
    pub pattern: u8,
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl BringupConfig {
    /// Display at 0x3D, ~1M cycle startup delay, pattern 0xFF
    pub const REFERENCE: Self = Self {
        address: DEFAULT_ADDRESS,
        startup_delay_cycles: 1_000_000,
        pacing: PacingConfig::REFERENCE,
        pattern: 0xFF,
    };

    /// Check the config before anything touches the bus
    pub fn validate(&self) -> Result<(), ErrorKind> {
        if self.address > MAX_ADDRESS {
            return Err(ErrorKind::ConfigError);
        }
        Ok(())
    }
}
