//! Display session
//!
//! Owns the framer and tracks, in the type, whether the controller has
//! been configured. Only a [`Configured`] session can write display RAM.

use core::marker::PhantomData;

use lumen_hal::{DelayCycles, I2cBus};

use crate::command::{cmd, page_select, COLUMNS, INIT_SEQUENCE, PAGES};
use crate::error::DisplayError;
use crate::framer::{Framer, SettleTiming};

/// Controller not yet configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uninitialized;

/// Init sequence sent; horizontal addressing mode active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configured;

/// Session with one SSD1306 controller
pub struct DisplaySession<B, D, S> {
    framer: Framer<B, D>,
    _state: PhantomData<S>,
}

type SessionResult<T, B> = Result<T, DisplayError<<B as I2cBus>::Error>>;

impl<B: I2cBus, D: DelayCycles, S> DisplaySession<B, D, S> {
    /// Bus address of the controller
    pub fn address(&self) -> u8 {
        self.framer.address()
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        self.framer.bus()
    }

    /// Release the bus and delay
    pub fn free(self) -> (B, D) {
        self.framer.free()
    }

    fn send_init_sequence(&mut self) -> SessionResult<(), B> {
        for &byte in INIT_SEQUENCE.iter() {
            self.framer.send_command(byte)?;
        }
        Ok(())
    }
}

impl<B: I2cBus, D: DelayCycles> DisplaySession<B, D, Uninitialized> {
    /// Wrap a bus; nothing is sent until [`initialize`](Self::initialize)
    pub fn new(bus: B, delay: D, address: u8, timing: SettleTiming) -> Self {
        Self {
            framer: Framer::new(bus, delay, address, timing),
            _state: PhantomData,
        }
    }

    /// Send the init sequence
    ///
    /// On error the session is dropped; the controller is in an unknown
    /// state and has to be initialized from scratch.
    pub fn initialize(mut self) -> SessionResult<DisplaySession<B, D, Configured>, B> {
        self.send_init_sequence()?;
        Ok(DisplaySession {
            framer: self.framer,
            _state: PhantomData,
        })
    }
}

impl<B: I2cBus, D: DelayCycles> DisplaySession<B, D, Configured> {
    /// Send the init sequence again
    ///
    /// The panel goes dark and comes back; RAM content is kept.
    pub fn reinitialize(&mut self) -> SessionResult<(), B> {
        self.send_init_sequence()
    }

    /// Panel dark, RAM kept
    pub fn power_off(&mut self) -> SessionResult<(), B> {
        self.framer.send_command(cmd::DISPLAY_OFF)
    }

    /// Panel shows RAM again
    pub fn power_on(&mut self) -> SessionResult<(), B> {
        self.framer.send_command(cmd::DISPLAY_ON)
    }

    /// Fill every page with `pattern`
    ///
    /// Page-major, column-minor: for each page, select it, reset the
    /// column to 0, then write all 128 columns.
    pub fn fill(&mut self, pattern: u8) -> SessionResult<(), B> {
        for page in 0..PAGES as u8 {
            self.framer.send_command(page_select(page))?;
            self.framer.send_command(cmd::SET_LOW_COLUMN)?;
            self.framer.send_command(cmd::SET_HIGH_COLUMN)?;
            for _ in 0..COLUMNS {
                self.framer.send_data(pattern)?;
            }
        }
        Ok(())
    }

    /// Blank the panel without showing stale RAM
    pub fn clear(&mut self) -> SessionResult<(), B> {
        self.power_off()?;
        self.fill(0x00)?;
        self.power_on()
    }

    /// Write one byte of display RAM at the controller's cursor
    pub fn send_data(&mut self, byte: u8) -> SessionResult<(), B> {
        self.framer.send_data(byte)
    }

    /// Send a raw command or operand byte
    pub fn send_command(&mut self, opcode: u8) -> SessionResult<(), B> {
        self.framer.send_command(opcode)
    }
}
