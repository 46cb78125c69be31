//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// I2C master programmed and enabled
    BusInitialized,
    /// Init sequence sent without a bus error
    DisplayInitialized,
    /// Power off, blank fill, power on completed
    DisplayCleared,
    /// Final data byte written
    PatternDrawn,
    /// A step failed
    ErrorDetected(ErrorKind),
}

impl Event {
    /// Check if this event indicates an error
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::ErrorDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_events() {
        assert!(Event::ErrorDetected(ErrorKind::BusFault).is_error_event());
        assert!(!Event::PatternDrawn.is_error_event());
    }
}
