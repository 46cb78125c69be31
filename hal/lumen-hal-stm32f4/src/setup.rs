//! One-time clock and pin setup
//!
//! Puts I2C1 on PB6 (SCL) / PB7 (SDA) as open-drain alternate-function
//! lines with pull-ups, and clocks the indicator port. Must run before
//! [`I2cMaster::init`](crate::i2c::I2cMaster::init).

use lumen_hal::DelayCycles;

use crate::pac::gpio::vals::{Moder, Ot, Pupdr};
use crate::pac::gpio::Gpio;
use crate::pac::rcc::Rcc;

/// I2C1 clock line
pub const SCL_PIN: usize = 6;
/// I2C1 data line
pub const SDA_PIN: usize = 7;
/// AF4 selects I2C1..3 on the F4
pub const I2C_ALTERNATE_FUNCTION: u8 = 4;
/// Wait after gating clocks on, before the first register write
pub const CLOCK_SETTLE_CYCLES: u32 = 1_000;

/// Enable the GPIOB, GPIOC and I2C1 clocks and let them settle
pub fn enable_clocks(rcc: Rcc, delay: &mut impl DelayCycles) {
    rcc.ahb1enr().modify(|w| {
        w.set_gpioben(true);
        w.set_gpiocen(true);
    });
    rcc.apb1enr().modify(|w| w.set_i2c1en(true));
    delay.delay_cycles(CLOCK_SETTLE_CYCLES);
}

/// Mux SCL/SDA to I2C1
pub fn configure_i2c_pins(port: Gpio) {
    for pin in [SCL_PIN, SDA_PIN] {
        port.afr(pin / 8)
            .modify(|w| w.set_afr(pin % 8, I2C_ALTERNATE_FUNCTION));
        port.otyper().modify(|w| w.set_ot(pin, Ot::OPEN_DRAIN));
        port.pupdr().modify(|w| w.set_pupdr(pin, Pupdr::PULL_UP));
        port.moder().modify(|w| w.set_moder(pin, Moder::ALTERNATE));
    }
}
