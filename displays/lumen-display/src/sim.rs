//! Host-side SSD1306 model
//!
//! [`Ssd1306Sim`] is an [`I2cBus`] that decodes what a real controller
//! would receive: control bytes, commands with their operands, and RAM
//! writes advancing the cursor per the addressing mode. Page and column
//! pointer commands (`0xB0..`, `0x00..`, `0x10..`) are honored in every
//! addressing mode.

use std::vec::Vec;

use lumen_hal::I2cBus;

use crate::command::{cmd, COLUMNS, PAGES};

/// One decoded byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Command or operand byte
    Command(u8),
    /// Display RAM byte
    Data(u8),
}

/// Write addressed to someone else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nack {
    pub address: u8,
}

/// Simulated SSD1306 controller
pub struct Ssd1306Sim {
    address: u8,
    ram: [[u8; COLUMNS]; PAGES],
    on: bool,
    charge_pump: bool,
    mode: u8,
    contrast: u8,
    page: usize,
    column: usize,
    column_range: (usize, usize),
    page_range: (usize, usize),
    /// Opcode waiting for operands, and how many are still due
    pending: Option<(u8, u8)>,
    operands: Vec<u8>,
    frames: Vec<Frame>,
}

impl Ssd1306Sim {
    /// Controller in its reset state, answering at `address`
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ram: [[0; COLUMNS]; PAGES],
            on: false,
            charge_pump: false,
            mode: cmd::MODE_PAGE,
            contrast: 0x7F,
            page: 0,
            column: 0,
            column_range: (0, COLUMNS - 1),
            page_range: (0, PAGES - 1),
            pending: None,
            operands: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Everything decoded so far, in order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn ram(&self) -> &[[u8; COLUMNS]; PAGES] {
        &self.ram
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn charge_pump_enabled(&self) -> bool {
        self.charge_pump
    }

    /// Memory addressing mode operand (0 horizontal, 1 vertical, 2 page)
    pub fn addressing_mode(&self) -> u8 {
        self.mode
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Current (page, column)
    pub fn cursor(&self) -> (usize, usize) {
        (self.page, self.column)
    }

    fn operand_count(opcode: u8) -> u8 {
        match opcode {
            cmd::SET_COLUMN_RANGE | cmd::SET_PAGE_RANGE => 2,
            cmd::SET_CLOCK_DIV
            | cmd::SET_MUX_RATIO
            | cmd::SET_DISPLAY_OFFSET
            | cmd::SET_CHARGE_PUMP
            | cmd::SET_MEMORY_MODE
            | cmd::SET_COM_PINS
            | cmd::SET_CONTRAST
            | cmd::SET_PRECHARGE
            | cmd::SET_VCOM_DETECT => 1,
            _ => 0,
        }
    }

    fn command(&mut self, byte: u8) {
        self.frames.push(Frame::Command(byte));

        if let Some((opcode, due)) = self.pending {
            self.operands.push(byte);
            if due > 1 {
                self.pending = Some((opcode, due - 1));
            } else {
                self.pending = None;
                let operands = core::mem::take(&mut self.operands);
                self.apply(opcode, &operands);
            }
            return;
        }

        match Self::operand_count(byte) {
            0 => self.apply(byte, &[]),
            due => self.pending = Some((byte, due)),
        }
    }

    fn apply(&mut self, opcode: u8, operands: &[u8]) {
        match (opcode, operands) {
            (cmd::DISPLAY_OFF, _) => self.on = false,
            (cmd::DISPLAY_ON, _) => self.on = true,
            (cmd::SET_CHARGE_PUMP, &[value]) => self.charge_pump = value & 0x04 != 0,
            (cmd::SET_MEMORY_MODE, &[mode]) => self.mode = mode & 0x03,
            (cmd::SET_CONTRAST, &[value]) => self.contrast = value,
            (cmd::SET_COLUMN_RANGE, &[start, end]) => {
                self.column_range = (start as usize & 0x7F, end as usize & 0x7F);
                self.column = self.column_range.0;
            }
            (cmd::SET_PAGE_RANGE, &[start, end]) => {
                self.page_range = (start as usize & 0x07, end as usize & 0x07);
                self.page = self.page_range.0;
            }
            (0xB0..=0xB7, _) => self.page = (opcode & 0x07) as usize,
            (0x00..=0x0F, _) => self.column = (self.column & 0xF0) | (opcode & 0x0F) as usize,
            (0x10..=0x17, _) => {
                self.column = (self.column & 0x0F) | (((opcode & 0x07) as usize) << 4)
            }
            // Everything else only affects how RAM is scanned out
            _ => {}
        }
    }

    fn data(&mut self, byte: u8) {
        self.frames.push(Frame::Data(byte));
        self.ram[self.page][self.column] = byte;
        self.advance();
    }

    fn advance(&mut self) {
        let (first_col, last_col) = self.column_range;
        let (first_page, last_page) = self.page_range;

        match self.mode {
            cmd::MODE_HORIZONTAL => {
                if self.column >= last_col {
                    self.column = first_col;
                    self.page = if self.page >= last_page {
                        first_page
                    } else {
                        self.page + 1
                    };
                } else {
                    self.column += 1;
                }
            }
            cmd::MODE_VERTICAL => {
                if self.page >= last_page {
                    self.page = first_page;
                    self.column = if self.column >= last_col {
                        first_col
                    } else {
                        self.column + 1
                    };
                } else {
                    self.page += 1;
                }
            }
            // Page mode wraps within the page
            _ => self.column = (self.column + 1) % COLUMNS,
        }
    }
}

impl I2cBus for Ssd1306Sim {
    type Error = Nack;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Nack> {
        if address != self.address {
            return Err(Nack { address });
        }

        let Some((&control, payload)) = data.split_first() else {
            return Ok(());
        };

        // D/C# is bit 6 of the control byte
        if control & 0x40 != 0 {
            for &byte in payload {
                self.data(byte);
            }
        } else {
            for &byte in payload {
                self.command(byte);
            }
        }
        Ok(())
    }
}
