//! Core traits defined in `docone-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
