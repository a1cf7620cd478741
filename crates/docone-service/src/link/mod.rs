//! Shareable link management and access decisions.

pub mod access;
pub mod registry;
pub mod settings;

pub use access::{AccessDecision, AccessValidator, DenyReason};
pub use registry::LinkRegistry;
pub use settings::{LinkSettings, LinkSettingsPatch};
