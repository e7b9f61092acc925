#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use session::{SessionError, SessionKind, SessionOutcome};
pub use time::Clock;
