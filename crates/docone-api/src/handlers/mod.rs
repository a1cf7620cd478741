//! HTTP handlers grouped by surface.

pub mod documents;
pub mod health;
pub mod links;
pub mod tracking;
pub mod viewer;
