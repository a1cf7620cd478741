//! # docone-database
//!
//! Storage contracts for every DocOne entity, their PostgreSQL
//! implementations, and a DashMap-backed in-memory store for single-process
//! deployments and tests. [`Storage`] selects the backend from configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use provider::Storage;
pub use store::{CaptureStore, DocumentStore, LinkStore, ViewStore};
