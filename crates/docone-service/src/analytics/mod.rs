//! Viewing session analytics.

pub mod tracker;

pub use tracker::{AnalyticsTracker, SessionOrigin};
