//! Command/data framing
//!
//! Each call is one bus transfer of exactly two bytes, followed by a
//! settling delay.

use lumen_hal::{DelayCycles, I2cBus, Transaction};

use crate::command::{CONTROL_COMMAND, CONTROL_DATA};
use crate::error::DisplayError;

/// Settling delays after each transfer, in delay cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettleTiming {
    /// After a command transfer
    pub command: u32,
    /// After a data transfer
    pub data: u32,
}

impl Default for SettleTiming {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl SettleTiming {
    /// 100 cycles after a command, 10 after data
    pub const REFERENCE: Self = Self {
        command: 100,
        data: 10,
    };

    /// No settling at all, for simulation
    pub const NONE: Self = Self {
        command: 0,
        data: 0,
    };
}

/// Frames command and data bytes for one controller
pub struct Framer<B, D> {
    bus: B,
    delay: D,
    address: u8,
    timing: SettleTiming,
}

impl<B: I2cBus, D: DelayCycles> Framer<B, D> {
    /// Frame transfers to the controller at `address`
    pub fn new(bus: B, delay: D, address: u8, timing: SettleTiming) -> Self {
        Self {
            bus,
            delay,
            address,
            timing,
        }
    }

    /// Send `[0x00, opcode]`, then settle
    pub fn send_command(&mut self, opcode: u8) -> Result<(), DisplayError<B::Error>> {
        self.bus
            .execute(Transaction::write(self.address, &[CONTROL_COMMAND, opcode]))
            .map_err(DisplayError::Bus)?;
        self.delay.delay_cycles(self.timing.command);
        Ok(())
    }

    /// Send `[0x40, byte]`, then settle
    pub fn send_data(&mut self, byte: u8) -> Result<(), DisplayError<B::Error>> {
        self.bus
            .execute(Transaction::write(self.address, &[CONTROL_DATA, byte]))
            .map_err(DisplayError::Bus)?;
        self.delay.delay_cycles(self.timing.data);
        Ok(())
    }

    /// Bus address every transfer goes to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the bus and delay
    pub fn free(self) -> (B, D) {
        (self.bus, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use lumen_hal::delay::NoDelay;
    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct Capture {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl I2cBus for Capture {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            self.writes.push((address, data.to_vec()));
            Ok(())
        }
    }

    struct FailingBus;

    impl I2cBus for FailingBus {
        type Error = u8;

        fn write(&mut self, _address: u8, _data: &[u8]) -> Result<(), u8> {
            Err(7)
        }
    }

    #[derive(Default)]
    struct Delays(Vec<u32>);

    impl DelayCycles for Delays {
        fn delay_cycles(&mut self, cycles: u32) {
            self.0.push(cycles);
        }
    }

    #[test]
    fn test_settle_after_each_transfer() {
        let mut framer = Framer::new(
            Capture::default(),
            Delays::default(),
            0x3D,
            SettleTiming::REFERENCE,
        );
        framer.send_command(0xAE).unwrap();
        framer.send_data(0x55).unwrap();
        framer.send_command(0xAF).unwrap();

        let (bus, delays) = framer.free();
        assert_eq!(delays.0, vec![100, 10, 100]);
        assert_eq!(
            bus.writes,
            vec![
                (0x3D, vec![0x00, 0xAE]),
                (0x3D, vec![0x40, 0x55]),
                (0x3D, vec![0x00, 0xAF]),
            ]
        );
    }

    #[test]
    fn test_bus_error_skips_settle() {
        let mut framer = Framer::new(FailingBus, Delays::default(), 0x3D, SettleTiming::REFERENCE);
        assert_eq!(framer.send_command(0xAE), Err(DisplayError::Bus(7)));
        assert_eq!(framer.send_data(0x00), Err(DisplayError::Bus(7)));

        let (_, delays) = framer.free();
        assert!(delays.0.is_empty());
    }

    proptest! {
        #[test]
        fn prop_framing_never_confused(byte in any::<u8>(), is_command in any::<bool>()) {
            let mut framer = Framer::new(Capture::default(), NoDelay, 0x3D, SettleTiming::NONE);
            if is_command {
                framer.send_command(byte).unwrap();
            } else {
                framer.send_data(byte).unwrap();
            }

            let (bus, _) = framer.free();
            let control = if is_command { CONTROL_COMMAND } else { CONTROL_DATA };
            prop_assert_eq!(&bus.writes, &vec![(0x3D, vec![control, byte])]);
        }
    }
}
