//! Viewing sessions and aggregate statistics.

pub mod stats;
pub mod view;

pub use stats::ViewStats;
pub use view::{DocumentView, Heartbeat, NewViewSession, SessionState};
