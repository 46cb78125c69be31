//! Display errors

/// Error from display operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// The bus transfer carrying a command or data byte failed
    Bus(E),
}

impl<E> DisplayError<E> {
    /// The underlying bus error
    pub fn bus_error(&self) -> &E {
        match self {
            DisplayError::Bus(e) => e,
        }
    }
}
