use super::error::SessionError;

/// Remaining time of a timed session, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    /// # Errors
    ///
    /// Returns `SessionError::ZeroDuration` for a zero-second countdown.
    pub fn new(total_secs: u32) -> Result<Self, SessionError> {
        if total_secs == 0 {
            return Err(SessionError::ZeroDuration);
        }
        Ok(Self {
            total: total_secs,
            remaining: total_secs,
        })
    }

    #[must_use]
    pub fn total_secs(self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining_secs(self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn elapsed_secs(self) -> u32 {
        self.total - self.remaining
    }

    #[must_use]
    pub fn is_expired(self) -> bool {
        self.remaining == 0
    }

    /// One second less, floored at zero.
    #[must_use]
    pub fn tick(self) -> Self {
        Self {
            remaining: self.remaining.saturating_sub(1),
            ..self
        }
    }

    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            remaining: self.total,
            ..self
        }
    }
}
