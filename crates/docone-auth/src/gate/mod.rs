//! Viewer gate state storage.

pub mod store;

pub use store::{CacheGateStore, GateStore};
