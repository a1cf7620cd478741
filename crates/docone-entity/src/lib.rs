//! # docone-entity
//!
//! Domain entity models for DocOne. Table rows derive `sqlx::FromRow`;
//! value objects (link changes, heartbeats, gate state, statistics) are
//! plain serde types shared by the storage, service, and API layers.

pub mod analytics;
pub mod capture;
pub mod document;
pub mod gate;
pub mod link;
