//! I2C bus abstractions
//!
//! Provides the write-only I2C master interface the display stack is built
//! on. Every transfer is a single addressed write: no combined reads, no
//! repeated start.

/// Highest valid 7-bit device address
pub const MAX_ADDRESS: u8 = 0x7F;

/// One addressed write
///
/// Created immediately before a transfer and consumed by it. The payload is
/// borrowed, so a transaction never outlives the call that issues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction<'a> {
    /// 7-bit target address
    pub address: u8,
    /// Payload bytes, sent in order
    pub bytes: &'a [u8],
}

impl<'a> Transaction<'a> {
    /// Create a write transaction to `address`
    pub const fn write(address: u8, bytes: &'a [u8]) -> Self {
        Self { address, bytes }
    }

    /// Address byte as it appears on the wire (write direction, R/W = 0)
    pub const fn address_byte(&self) -> u8 {
        (self.address << 1) & 0xFE
    }

    /// Check that the address fits in 7 bits
    pub const fn has_valid_address(&self) -> bool {
        self.address <= MAX_ADDRESS
    }
}

/// I2C bus master
///
/// At most one transaction may be in flight at a time; implementations
/// block until the transfer has completed (STOP confirmed) or failed.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Run a prepared transaction
    fn execute(&mut self, transaction: Transaction<'_>) -> Result<(), Self::Error> {
        self.write(transaction.address, transaction.bytes)
    }
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, data)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Check whether this is a standard-mode (≤ 100 kHz) configuration
    pub const fn is_standard_mode(&self) -> bool {
        self.frequency <= Self::STANDARD.frequency
    }
}
