//! Countdown timer: a pure state machine plus the task that drives it.

pub mod alert;
pub mod controller;
pub mod sink;
pub mod state;

pub use alert::CompletionAlert;
pub use controller::TimerController;
pub use sink::{HttpSessionSink, SessionSink, StoreSessionSink};
pub use state::{TimerError, TimerState, TimerStatus, parse_minutes};
