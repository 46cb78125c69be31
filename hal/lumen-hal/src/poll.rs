//! Retryable status polling
//!
//! Every wait in the I2C protocol is "spin until a flag reads a given
//! value". [`PollBudget`] turns that spin into a bounded operation that
//! reports exhaustion, while still offering an unbounded mode that never
//! gives up.

/// The poll budget ran out before the condition held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Exhausted;

/// How many times a status condition may be sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollBudget {
    /// Spin forever; a condition that never holds hangs the caller
    Unbounded,
    /// Give up after this many samples
    Attempts(u32),
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::Attempts(100_000)
    }
}

impl PollBudget {
    /// Build a budget from a raw count, where 0 means unbounded
    pub const fn from_count(count: u32) -> Self {
        if count == 0 {
            Self::Unbounded
        } else {
            Self::Attempts(count)
        }
    }

    /// Check whether this budget can ever run out
    pub const fn is_bounded(&self) -> bool {
        matches!(self, Self::Attempts(_))
    }

    /// Sample `condition` until it returns true or the budget runs out
    ///
    /// The condition is always sampled at least once, even with
    /// `Attempts(0)`.
    pub fn poll_until<F>(self, mut condition: F) -> Result<(), Exhausted>
    where
        F: FnMut() -> bool,
    {
        match self {
            Self::Unbounded => loop {
                if condition() {
                    return Ok(());
                }
                core::hint::spin_loop();
            },
            Self::Attempts(limit) => {
                let mut remaining = limit.max(1);
                loop {
                    if condition() {
                        return Ok(());
                    }
                    remaining -= 1;
                    if remaining == 0 {
                        return Err(Exhausted);
                    }
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Like [`poll_until`](Self::poll_until), but the condition can abort
    /// early with an error of its own
    pub fn try_poll_until<F, E>(self, mut condition: F, exhausted: E) -> Result<(), E>
    where
        F: FnMut() -> Result<bool, E>,
    {
        let mut failure = None;
        let outcome = self.poll_until(|| match condition() {
            Ok(done) => done,
            Err(e) => {
                failure = Some(e);
                true
            }
        });

        match (failure, outcome) {
            (Some(e), _) => Err(e),
            (None, Ok(())) => Ok(()),
            (None, Err(Exhausted)) => Err(exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_poll_succeeds_before_limit() {
        let mut samples = 0;
        let result = PollBudget::Attempts(10).poll_until(|| {
            samples += 1;
            samples == 3
        });
        assert_eq!(result, Ok(()));
        assert_eq!(samples, 3);
    }

    #[test]
    fn test_bounded_poll_exhausts() {
        let mut samples = 0;
        let result = PollBudget::Attempts(5).poll_until(|| {
            samples += 1;
            false
        });
        assert_eq!(result, Err(Exhausted));
        assert_eq!(samples, 5);
    }

    #[test]
    fn test_zero_attempts_samples_once() {
        let mut samples = 0;
        let result = PollBudget::Attempts(0).poll_until(|| {
            samples += 1;
            true
        });
        assert_eq!(result, Ok(()));
        assert_eq!(samples, 1);
    }

    #[test]
    fn test_unbounded_poll_waits() {
        let mut samples = 0u32;
        let result = PollBudget::Unbounded.poll_until(|| {
            samples += 1;
            samples == 250_000
        });
        assert_eq!(result, Ok(()));
        assert_eq!(samples, 250_000);
    }

    #[test]
    fn test_try_poll_propagates_condition_error() {
        let result: Result<(), &str> =
            PollBudget::Attempts(10).try_poll_until(|| Err("nack"), "timeout");
        assert_eq!(result, Err("nack"));
    }

    #[test]
    fn test_try_poll_maps_exhaustion() {
        let result: Result<(), &str> =
            PollBudget::Attempts(3).try_poll_until(|| Ok(false), "timeout");
        assert_eq!(result, Err("timeout"));
    }

    #[test]
    fn test_from_count() {
        assert_eq!(PollBudget::from_count(0), PollBudget::Unbounded);
        assert_eq!(PollBudget::from_count(7), PollBudget::Attempts(7));
        assert!(!PollBudget::Unbounded.is_bounded());
        assert!(PollBudget::default().is_bounded());
    }
}
