//! Display bring-up
//!
//! Startup delay, bus init, display init, clear, one pattern byte, then
//! the indicator goes on. Every step is driven through the state machine;
//! the first failure ends the run in [`State::Error`].

use embedded_hal::i2c::{Error as _, ErrorKind as BusErrorKind};
use heapless::Vec;
use lumen_display::{DisplayError, DisplaySession};
use lumen_hal::{DelayCycles, I2cBus, OutputPin};

use crate::config::BringupConfig;
use crate::state::{ErrorKind, Event, State};

/// Longest possible run: Boot, four steps, or an error in their place
pub const HISTORY_LEN: usize = 6;

/// Outcome of [`run_bringup`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bringup {
    state: State,
    history: Vec<State, HISTORY_LEN>,
}

impl Default for Bringup {
    fn default() -> Self {
        Self::new()
    }
}

impl Bringup {
    pub fn new() -> Self {
        let mut history = Vec::new();
        // Capacity is non-zero
        let _ = history.push(State::Boot);
        Self {
            state: State::Boot,
            history,
        }
    }

    /// Final state
    pub fn state(&self) -> State {
        self.state
    }

    /// Every state visited, starting with [`State::Boot`]
    pub fn history(&self) -> &[State] {
        &self.history
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self.state {
            State::Error(kind) => Some(kind),
            _ => None,
        }
    }

    /// Feed one event through the state machine
    pub fn apply(&mut self, event: Event) -> State {
        let next = self.state.transition(event);
        if next != self.state {
            #[cfg(feature = "defmt")]
            defmt::info!("bring-up: {} -> {}", self.state, next);

            self.state = next;
            // Terminal after at most five transitions, so this never overflows
            let _ = self.history.push(next);
        }
        next
    }

    fn fail(&mut self, kind: ErrorKind) -> State {
        #[cfg(feature = "defmt")]
        defmt::error!("bring-up failed in {}: {}", self.state, kind);

        self.apply(Event::ErrorDetected(kind))
    }
}

/// Map a display transfer failure onto the bring-up error kinds
///
/// A NACK means the bus works but nobody answered at the display's
/// address; anything else is the bus itself misbehaving.
pub fn classify<E: embedded_hal::i2c::Error>(error: &DisplayError<E>) -> ErrorKind {
    match error.bus_error().kind() {
        BusErrorKind::NoAcknowledge(_) => ErrorKind::DisplayFault,
        _ => ErrorKind::BusFault,
    }
}

/// Bring the display up
///
/// `init_bus` is called once, after the startup delay, and must return a
/// bus whose master is already programmed and enabled. The indicator is
/// only touched on success, and then exactly once.
pub fn run_bringup<B, D, P, F>(
    config: &BringupConfig,
    mut delay: D,
    init_bus: F,
    indicator: &mut P,
) -> Bringup
where
    B: I2cBus,
    B::Error: embedded_hal::i2c::Error,
    D: DelayCycles,
    P: OutputPin,
    F: FnOnce() -> B,
{
    let mut bringup = Bringup::new();

    if let Err(kind) = config.validate() {
        bringup.fail(kind);
        return bringup;
    }

    delay.delay_cycles(config.startup_delay_cycles);

    let bus = init_bus();
    bringup.apply(Event::BusInitialized);

    let session = DisplaySession::new(
        bus,
        &mut delay,
        config.address,
        config.pacing.settle_timing(),
    );
    let mut session = match session.initialize() {
        Ok(session) => session,
        Err(e) => {
            bringup.fail(classify(&e));
            return bringup;
        }
    };
    bringup.apply(Event::DisplayInitialized);

    if let Err(e) = session.clear() {
        bringup.fail(classify(&e));
        return bringup;
    }
    bringup.apply(Event::DisplayCleared);

    if let Err(e) = session.send_data(config.pattern) {
        bringup.fail(classify(&e));
        return bringup;
    }
    if bringup.apply(Event::PatternDrawn) == State::Ready {
        indicator.set_high();
    }

    bringup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> BusErrorKind {
            BusErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address)
        }
    }

    #[test]
    fn test_history_records_each_change_once() {
        let mut bringup = Bringup::new();
        bringup.apply(Event::BusInitialized);
        // Out of order, ignored
        bringup.apply(Event::PatternDrawn);
        bringup.apply(Event::ErrorDetected(ErrorKind::BusFault));
        bringup.apply(Event::DisplayInitialized);

        assert_eq!(
            bringup.history(),
            &[
                State::Boot,
                State::BusReady,
                State::Error(ErrorKind::BusFault)
            ]
        );
        assert_eq!(bringup.error(), Some(ErrorKind::BusFault));
        assert!(!bringup.is_ready());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&DisplayError::Bus(Nack)), ErrorKind::DisplayFault);
        assert_eq!(
            classify(&DisplayError::Bus(BusErrorKind::Bus)),
            ErrorKind::BusFault
        );
    }
}
