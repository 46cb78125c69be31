//! I2C master engine for STM32F4
//!
//! Polled, write-only master transactions on the F4 "v1" I2C peripheral.
//! Each transaction runs, in order:
//!
//! 1. wait for the bus to go idle (SR2.BUSY clear)
//! 2. generate START, wait for SR1.SB
//! 3. send `address << 1` (write), wait for SR1.ADDR, clear it by reading
//!    SR1 then SR2
//! 4. for each byte: wait for SR1.TXE, write DR, pace
//! 5. wait for SR1.BTF
//! 6. generate STOP, wait for CR1.STOP to self-clear
//!
//! Every wait is a [`PollBudget`] poll. With [`EngineConfig::REFERENCE`] the
//! polls are unbounded and NACKs go unnoticed, so a silent target hangs the
//! caller; the default configuration bounds every poll and reports which
//! step failed.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};
use lumen_hal::i2c::I2cConfig;
use lumen_hal::{DelayCycles, I2cBus, PollBudget, Transaction};

use crate::pac::i2c::regs::{Cr1, Sr1, Sr2};
use crate::pac::i2c::I2c;

/// Register access used by the engine
///
/// Implemented for the memory-mapped block and for the host simulator.
/// Status reads take `&mut self` because on this peripheral reading is part
/// of the flag-clearing protocol.
pub trait I2cRegisters {
    /// Read CR1
    fn control(&mut self) -> Cr1;

    /// Write CR1
    fn set_control(&mut self, value: Cr1);

    /// Read CR1, change it, write it back
    fn modify_control(&mut self, f: impl FnOnce(&mut Cr1)) {
        let mut value = self.control();
        f(&mut value);
        self.set_control(value);
    }

    /// Program CR2.FREQ, CCR and TRISE
    fn configure_timing(&mut self, timing: BusTiming);

    /// Read SR1
    fn status1(&mut self) -> Sr1;

    /// Read SR2
    fn status2(&mut self) -> Sr2;

    /// Write one byte to DR
    fn write_data(&mut self, byte: u8);

    /// Clear SR1.AF
    fn clear_ack_failure(&mut self);
}

impl I2cRegisters for I2c {
    fn control(&mut self) -> Cr1 {
        self.cr1().read()
    }

    fn set_control(&mut self, value: Cr1) {
        self.cr1().write_value(value);
    }

    fn configure_timing(&mut self, timing: BusTiming) {
        self.cr2().modify(|w| w.set_freq(timing.peripheral_clock_mhz));
        self.ccr().modify(|w| w.set_ccr(timing.ccr));
        self.trise().write(|w| w.set_trise(timing.trise));
    }

    fn status1(&mut self) -> Sr1 {
        self.sr1().read()
    }

    fn status2(&mut self) -> Sr2 {
        self.sr2().read()
    }

    fn write_data(&mut self, byte: u8) {
        self.dr().write(|w| w.set_dr(byte));
    }

    fn clear_ack_failure(&mut self) {
        // rc_w0: writing back the other flags as read leaves them alone
        self.sr1().modify(|w| w.set_af(false));
    }
}

/// Clock-control and rise-time settings
///
/// Derived from the peripheral clock and target bus speed, fixed at build
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// APB1 clock in MHz (CR2.FREQ)
    pub peripheral_clock_mhz: u8,
    /// Clock control value (CCR)
    pub ccr: u16,
    /// Maximum rise time (TRISE)
    pub trise: u8,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl BusTiming {
    /// 16 MHz APB1, 100 kHz standard mode
    pub const REFERENCE: Self = Self::standard_mode(16, I2cConfig::STANDARD);

    /// Standard-mode timing
    ///
    /// CCR = f_pclk / (2 * f_scl), TRISE = 1000 ns / t_pclk + 1.
    pub const fn standard_mode(peripheral_clock_mhz: u8, config: I2cConfig) -> Self {
        let pclk_hz = peripheral_clock_mhz as u32 * 1_000_000;
        let ccr = pclk_hz / (2 * config.frequency);
        Self {
            peripheral_clock_mhz,
            ccr: ccr as u16,
            trise: peripheral_clock_mhz + 1,
        }
    }
}

/// Engine behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Budget for every status poll
    pub budget: PollBudget,
    /// Check SR1.AF while waiting and fail on a NACK
    pub detect_nack: bool,
    /// Busy-wait after each data byte, in delay cycles
    ///
    /// Legacy timing margin; the protocol does not require it.
    pub byte_pacing: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: PollBudget::default(),
            detect_nack: true,
            byte_pacing: Self::DEFAULT_BYTE_PACING,
        }
    }
}

impl EngineConfig {
    /// Pacing applied after each data byte unless configured otherwise
    pub const DEFAULT_BYTE_PACING: u32 = 10;

    /// Unbounded polls, no NACK detection
    pub const REFERENCE: Self = Self {
        budget: PollBudget::Unbounded,
        detect_nack: false,
        byte_pacing: Self::DEFAULT_BYTE_PACING,
    };
}

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Address does not fit in 7 bits
    InvalidAddress,
    /// Bus never went idle
    BusBusyTimeout,
    /// START was not acknowledged by the peripheral
    StartTimeout,
    /// Target NACKed its address
    AddressNack,
    /// Address phase never completed
    AddressTimeout,
    /// Target NACKed a data byte
    DataNack,
    /// TXE or BTF never observed mid-transfer
    ByteTimeout,
    /// STOP never confirmed
    StopTimeout,
    /// Read operations are not supported
    Unsupported,
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> ErrorKind {
        match *self {
            I2cError::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            I2cError::DataNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            I2cError::BusBusyTimeout => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}

/// Polled I2C master
pub struct I2cMaster<R, D> {
    regs: R,
    delay: D,
    config: EngineConfig,
}

impl<R: I2cRegisters, D: DelayCycles> I2cMaster<R, D> {
    /// Create an engine over an already clocked and pinned peripheral
    ///
    /// Call [`init`](Self::init) once before the first transfer.
    pub fn new(regs: R, delay: D, config: EngineConfig) -> Self {
        Self {
            regs,
            delay,
            config,
        }
    }

    /// Program clock control and rise time, then enable the peripheral
    pub fn init(&mut self, timing: BusTiming) {
        self.regs.configure_timing(timing);
        self.regs.modify_control(|w| w.set_pe(true));
    }

    /// Engine settings this master was created with
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Borrow the register backend
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Release the register backend and delay
    pub fn free(self) -> (R, D) {
        (self.regs, self.delay)
    }

    /// Write `bytes` to the device at `address` in one START…STOP
    pub fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), I2cError> {
        self.execute(Transaction::write(address, bytes))
    }

    /// Run one addressed write
    pub fn execute(&mut self, transaction: Transaction<'_>) -> Result<(), I2cError> {
        self.run(transaction, [])
    }

    /// Send `transaction`, then every buffer in `tail`, in a single
    /// START…STOP
    fn run<'b, I>(&mut self, transaction: Transaction<'b>, tail: I) -> Result<(), I2cError>
    where
        I: IntoIterator<Item = &'b [u8]>,
    {
        if !transaction.has_valid_address() {
            return Err(I2cError::InvalidAddress);
        }

        self.wait(I2cError::BusBusyTimeout, |regs| !regs.status2().busy())?;

        self.regs.modify_control(|w| w.set_start(true));

        let bytes = core::iter::once(transaction.bytes).chain(tail);
        match self.transfer(transaction.address_byte(), bytes) {
            Ok(()) => self.stop(),
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    fn transfer<'b, I>(&mut self, address_byte: u8, chunks: I) -> Result<(), I2cError>
    where
        I: IntoIterator<Item = &'b [u8]>,
    {
        self.wait(I2cError::StartTimeout, |regs| regs.status1().start())?;

        self.regs.write_data(address_byte);
        self.wait_acked(I2cError::AddressNack, I2cError::AddressTimeout, |sr1| {
            sr1.addr()
        })?;

        // ADDR clears on SR1 then SR2 read; values are irrelevant
        let _ = self.regs.status1();
        let _ = self.regs.status2();

        for &byte in chunks.into_iter().flatten() {
            self.wait_acked(I2cError::DataNack, I2cError::ByteTimeout, |sr1| sr1.txe())?;
            self.regs.write_data(byte);
            self.delay.delay_cycles(self.config.byte_pacing);
        }

        self.wait_acked(I2cError::DataNack, I2cError::ByteTimeout, |sr1| sr1.btf())
    }

    fn stop(&mut self) -> Result<(), I2cError> {
        self.regs.modify_control(|w| w.set_stop(true));
        self.wait(I2cError::StopTimeout, |regs| !regs.control().stop())
    }

    /// Release the bus after a failed transfer
    fn abort(&mut self) {
        if self.regs.status1().af() {
            self.regs.clear_ack_failure();
        }
        // The transfer error is the one worth reporting
        let _ = self.stop();
    }

    fn wait<F>(&mut self, timeout: I2cError, mut ready: F) -> Result<(), I2cError>
    where
        F: FnMut(&mut R) -> bool,
    {
        let budget = self.config.budget;
        let regs = &mut self.regs;
        budget.poll_until(|| ready(&mut *regs)).map_err(|_| timeout)
    }

    fn wait_acked<F>(&mut self, nack: I2cError, timeout: I2cError, ready: F) -> Result<(), I2cError>
    where
        F: Fn(Sr1) -> bool,
    {
        let budget = self.config.budget;
        let detect_nack = self.config.detect_nack;
        let regs = &mut self.regs;
        budget.try_poll_until(
            || {
                let sr1 = regs.status1();
                if detect_nack && sr1.af() {
                    Err(nack)
                } else {
                    Ok(ready(sr1))
                }
            },
            timeout,
        )
    }
}

impl<R: I2cRegisters, D: DelayCycles> I2cBus for I2cMaster<R, D> {
    type Error = I2cError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        I2cMaster::write(self, address, data)
    }

    fn execute(&mut self, transaction: Transaction<'_>) -> Result<(), I2cError> {
        I2cMaster::execute(self, transaction)
    }
}

impl<R, D> embedded_hal::i2c::ErrorType for I2cMaster<R, D> {
    type Error = I2cError;
}

impl<R: I2cRegisters, D: DelayCycles> embedded_hal::i2c::I2c for I2cMaster<R, D> {
    /// Consecutive writes go out as one START…STOP; reads are rejected
    /// before the bus is touched.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), I2cError> {
        if operations
            .iter()
            .any(|op| matches!(op, Operation::Read(_)))
        {
            return Err(I2cError::Unsupported);
        }

        let mut writes = operations.iter().map(|op| match op {
            Operation::Write(bytes) => *bytes,
            Operation::Read(_) => &[][..],
        });
        let first = writes.next().unwrap_or(&[]);
        self.run(Transaction::write(address, first), writes)
    }
}
