//! Captured viewer emails.

pub mod model;

pub use model::{CapturedEmail, NewCapture};
