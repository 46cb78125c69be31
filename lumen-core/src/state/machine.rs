//! State machine definition

use super::events::Event;

/// Bring-up states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on, waiting out the startup delay
    Boot,
    /// I2C master enabled, display untouched
    BusReady,
    /// Init sequence accepted by the controller
    DisplayConfigured,
    /// Display RAM blanked, panel on
    Cleared,
    /// Pattern drawn and indicator on
    Ready,
    /// Bring-up failed; nothing further is attempted
    Error(ErrorKind),
}

/// Types of errors that can stop bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bus never idle, flags never raised, STOP never confirmed
    BusFault,
    /// Display did not acknowledge
    DisplayFault,
    /// Configuration error
    ConfigError,
}

impl State {
    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Check if no further event can move this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Ready | State::Error(_))
    }

    /// Check if the display may be sent RAM data in this state
    pub fn display_configured(&self) -> bool {
        matches!(self, State::DisplayConfigured | State::Cleared | State::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Boot, BusInitialized) => BusReady,
            (BusReady, DisplayInitialized) => DisplayConfigured,
            (DisplayConfigured, DisplayCleared) => Cleared,
            (Cleared, PatternDrawn) => Ready,

            // Terminal states ignore everything, errors included
            (Ready | Error(_), _) => self,

            (_, ErrorDetected(kind)) => Error(kind),

            // Out-of-order events leave the state alone
            _ => self,
        }
    }
}
