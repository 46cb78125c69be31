//! Lumen - SSD1306 bring-up firmware
//!
//! Brings up I2C1 on an STM32F4, initializes a 128x64 SSD1306 panel,
//! clears it, draws one byte and turns the indicator on. Then parks.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use {defmt_rtt as _, panic_probe as _};

use lumen_core::{run_bringup, State};
use lumen_hal::SpinDelay;
use lumen_hal_stm32f4::gpio::{Indicator, INDICATOR_PIN};
use lumen_hal_stm32f4::i2c::I2cMaster;
use lumen_hal_stm32f4::{pac, setup};

mod board;

#[entry]
fn main() -> ! {
    info!("Lumen firmware starting...");

    let mut delay = SpinDelay::new();
    setup::enable_clocks(pac::RCC, &mut delay);
    let mut indicator = Indicator::new(pac::GPIOC, INDICATOR_PIN);

    info!(
        "I2C1: {} MHz pclk, CCR={}, TRISE={}, display at {=u8:#x}",
        board::BUS_TIMING.peripheral_clock_mhz,
        board::BUS_TIMING.ccr,
        board::BUS_TIMING.trise,
        board::BRINGUP.address
    );

    let mut master = I2cMaster::new(pac::I2C1, SpinDelay::new(), board::ENGINE);
    debug!("I2C engine: {}", master.config());
    let bus = &mut master;
    let report = run_bringup(
        &board::BRINGUP,
        delay,
        move || {
            setup::configure_i2c_pins(pac::GPIOB);
            bus.init(board::BUS_TIMING);
            bus
        },
        &mut indicator,
    );

    match report.state() {
        State::Ready => info!("Display ready"),
        state => error!("Bring-up stopped in {}", state),
    }

    loop {
        cortex_m::asm::wfi();
    }
}
