//! Indicator output
//!
//! A single push-pull output that signals "bring-up finished". On the
//! reference board it is PC13.

use lumen_hal::OutputPin;

use crate::pac::gpio::vals::{Moder, Odr, Ot};
use crate::pac::gpio::Gpio;

/// Indicator pin number on GPIOC
pub const INDICATOR_PIN: usize = 13;

/// Push-pull output driven through ODR
pub struct Indicator {
    port: Gpio,
    pin: usize,
}

impl Indicator {
    /// Configure `pin` of `port` as an output, driven low
    ///
    /// The port clock must already be enabled.
    pub fn new(port: Gpio, pin: usize) -> Self {
        port.odr().modify(|w| w.set_odr(pin, Odr::LOW));
        port.otyper().modify(|w| w.set_ot(pin, Ot::PUSH_PULL));
        port.moder().modify(|w| w.set_moder(pin, Moder::OUTPUT));
        Self { port, pin }
    }
}

impl OutputPin for Indicator {
    fn set_high(&mut self) {
        self.port.odr().modify(|w| w.set_odr(self.pin, Odr::HIGH));
    }

    fn set_low(&mut self) {
        self.port.odr().modify(|w| w.set_odr(self.pin, Odr::LOW));
    }

    fn is_set_high(&self) -> bool {
        self.port.odr().read().odr(self.pin) == Odr::HIGH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detached;

    #[test]
    fn test_new_configures_output_low() {
        let port = detached::gpio();
        port.odr().modify(|w| w.set_odr(INDICATOR_PIN, Odr::HIGH));

        let indicator = Indicator::new(port, INDICATOR_PIN);
        assert_eq!(port.moder().read().moder(INDICATOR_PIN), Moder::OUTPUT);
        assert_eq!(port.otyper().read().ot(INDICATOR_PIN), Ot::PUSH_PULL);
        assert!(indicator.is_set_low());
    }

    #[test]
    fn test_drives_only_its_own_bit() {
        let port = detached::gpio();
        port.odr().modify(|w| w.set_odr(2, Odr::HIGH));

        let mut indicator = Indicator::new(port, INDICATOR_PIN);
        indicator.set_high();
        assert_eq!(port.odr().read().odr(INDICATOR_PIN), Odr::HIGH);
        assert_eq!(port.odr().read().odr(2), Odr::HIGH);

        indicator.toggle();
        assert_eq!(port.odr().read().odr(INDICATOR_PIN), Odr::LOW);
        assert_eq!(port.odr().read().odr(2), Odr::HIGH);
    }
}
