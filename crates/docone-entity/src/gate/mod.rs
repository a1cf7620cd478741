//! Per-viewer, per-link gate progress.

pub mod state;

pub use state::GateState;
