use super::error::SessionError;

/// Position within a fixed, non-empty item sequence.
///
/// Always satisfies `index < len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when `len` is zero.
    pub fn new(len: usize) -> Result<Self, SessionError> {
        if len == 0 {
            return Err(SessionError::Empty);
        }
        Ok(Self { index: 0, len })
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.index + 1 == self.len
    }

    /// One step forward, clamped at the last item.
    #[must_use]
    pub fn forward(self) -> Self {
        Self {
            index: (self.index + 1).min(self.len - 1),
            ..self
        }
    }

    /// One step back, clamped at the first item.
    #[must_use]
    pub fn back(self) -> Self {
        Self {
            index: self.index.saturating_sub(1),
            ..self
        }
    }

    #[must_use]
    pub fn reset(self) -> Self {
        Self { index: 0, ..self }
    }

    /// One-based position, e.g. "Question 2 of 5".
    #[must_use]
    pub fn position(self) -> usize {
        self.index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor_is_rejected() {
        assert_eq!(Cursor::new(0).unwrap_err(), SessionError::Empty);
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let c = Cursor::new(2).unwrap();
        assert_eq!(c.back().index(), 0);
        let last = c.forward().forward().forward();
        assert_eq!(last.index(), 1);
        assert!(last.is_last());
        assert_eq!(last.position(), 2);
        assert_eq!(last.reset(), c);
    }

    #[test]
    fn single_item_is_first_and_last() {
        let c = Cursor::new(1).unwrap();
        assert!(c.is_first());
        assert!(c.is_last());
        assert_eq!(c.forward(), c);
    }
}
