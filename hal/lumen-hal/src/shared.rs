//! Shared bus access
//!
//! A transaction is only atomic if nothing else touches the peripheral
//! between START and STOP. [`SharedBus`] lets several drivers hold a handle
//! to the same bus while serializing whole transactions behind a critical
//! section.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::i2c::I2cBus;

/// Bus shared between several owners
pub struct SharedBus<B> {
    cell: Mutex<RefCell<B>>,
}

impl<B> SharedBus<B> {
    /// Wrap a bus for shared use
    pub const fn new(bus: B) -> Self {
        Self {
            cell: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Get a handle that implements [`I2cBus`]
    pub fn handle(&self) -> SharedBusHandle<'_, B> {
        SharedBusHandle { bus: self }
    }

    /// Run `f` with exclusive access to the bus
    pub fn with<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        critical_section::with(|cs| f(&mut self.cell.borrow_ref_mut(cs)))
    }

    /// Take the bus back out
    pub fn into_inner(self) -> B {
        self.cell.into_inner().into_inner()
    }
}

/// Borrowed handle to a [`SharedBus`]
///
/// Each `write` holds the critical section from START to STOP.
pub struct SharedBusHandle<'a, B> {
    bus: &'a SharedBus<B>,
}

impl<B> Clone for SharedBusHandle<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for SharedBusHandle<'_, B> {}

impl<B: I2cBus> I2cBus for SharedBusHandle<'_, B> {
    type Error = B::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.with(|bus| bus.write(address, data))
    }
}
