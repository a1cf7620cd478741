//! # docone-service
//!
//! Business logic for DocOne. The link registry, access validator,
//! analytics tracker, and email capture ledger are composed by the viewer
//! flow, which walks an anonymous viewer through the password and email
//! gates before granting a view.
//!
//! Services follow constructor injection: every dependency is provided at
//! construction time via `Arc` references to the storage contracts, so the
//! same code runs against PostgreSQL and the in-memory store.

pub mod analytics;
pub mod capture;
pub mod context;
pub mod document;
pub mod link;
pub mod ownership;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;

pub use analytics::AnalyticsTracker;
pub use capture::EmailCaptureLedger;
pub use context::RequestContext;
pub use document::{DocumentConverter, DocumentService, DocumentStorage, LibreOfficeConverter};
pub use link::{AccessDecision, AccessValidator, DenyReason, LinkRegistry};
pub use ownership::OwnershipGuard;
pub use viewer::{ViewerClient, ViewerOutcome, ViewerService};
