//! Board configuration
//!
//! Raw values come from `board.toml` via build.rs; this module shapes
//! them into the driver and bring-up config types.

use lumen_core::{BringupConfig, PacingConfig};
use lumen_hal::i2c::I2cConfig;
use lumen_hal::PollBudget;
use lumen_hal_stm32f4::i2c::{BusTiming, EngineConfig};

mod raw {
    include!(concat!(env!("OUT_DIR"), "/board.rs"));
}

pub const BUS_TIMING: BusTiming = BusTiming {
    peripheral_clock_mhz: raw::PERIPHERAL_CLOCK_MHZ,
    ccr: raw::CCR,
    trise: raw::TRISE,
};

// build.rs checks the same thing; keep the driver's formula honest too
const _: () = {
    let derived = BusTiming::standard_mode(
        raw::PERIPHERAL_CLOCK_MHZ,
        I2cConfig {
            frequency: raw::BUS_SPEED_HZ,
        },
    );
    assert!(derived.ccr == BUS_TIMING.ccr);
    assert!(derived.trise == BUS_TIMING.trise);
};

pub const ENGINE: EngineConfig = EngineConfig {
    budget: PollBudget::from_count(raw::POLL_BUDGET),
    detect_nack: raw::DETECT_NACK,
    byte_pacing: raw::BYTE_PACING_CYCLES,
};

pub const BRINGUP: BringupConfig = BringupConfig {
    address: raw::DISPLAY_ADDRESS,
    startup_delay_cycles: raw::STARTUP_DELAY_CYCLES,
    pacing: PacingConfig {
        command_settle: raw::COMMAND_SETTLE_CYCLES,
        data_settle: raw::DATA_SETTLE_CYCLES,
        byte_pacing: raw::BYTE_PACING_CYCLES,
    },
    pattern: 0xFF,
};
