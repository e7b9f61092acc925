use chrono::{DateTime, Utc};

/// Where sessions and services read "now" from.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::System
    }

    /// A clock that always reports `at`.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Whole seconds from `from` to `to`, clamped to `0..=u32::MAX`.
#[must_use]
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let secs = (to - from).num_seconds().max(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Renders remaining time as `m:ss`, e.g. `45:00` or `0:07`.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// 2023-11-14T22:13:20Z, the instant every fixed clock in tests starts at.
pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Never in practice: `FIXED_TIMESTAMP` is in range.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TIMESTAMP, 0).expect("timestamp in range")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
