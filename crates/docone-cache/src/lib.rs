//! # docone-cache
//!
//! Cache providers for DocOne:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka),
//!   with per-entry TTLs
//! - **redis**: shared cache using the [redis](https://crates.io/crates/redis)
//!   crate, required when more than one server instance runs
//!
//! The provider is selected at runtime from configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
