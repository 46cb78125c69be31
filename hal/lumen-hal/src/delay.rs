//! Bus timing primitive
//!
//! A coarse busy-wait measured in loop iterations rather than time. It is
//! used both as a hardware settling delay and as pacing between transfer
//! steps; nothing here is calibrated against a clock.

/// Busy-wait delay measured in loop iterations
pub trait DelayCycles {
    /// Spin for approximately `cycles` iterations
    fn delay_cycles(&mut self, cycles: u32);
}

impl<T: DelayCycles + ?Sized> DelayCycles for &mut T {
    fn delay_cycles(&mut self, cycles: u32) {
        (**self).delay_cycles(cycles);
    }
}

/// Spin-loop delay
///
/// Each iteration passes the counter through [`core::hint::black_box`], so
/// the optimizer has to treat it as observable and cannot fold the loop away.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    /// Create a new spin delay
    pub const fn new() -> Self {
        Self
    }
}

impl DelayCycles for SpinDelay {
    #[inline(never)]
    fn delay_cycles(&mut self, cycles: u32) {
        for i in 0..cycles {
            core::hint::black_box(i);
            core::hint::spin_loop();
        }
    }
}

/// Delay that does nothing
///
/// For host simulation, where settling time is meaningless.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayCycles for NoDelay {
    fn delay_cycles(&mut self, _cycles: u32) {}
}
