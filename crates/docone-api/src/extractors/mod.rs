//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod path;
pub mod track;
pub mod viewer;

pub use auth::AuthUser;
pub use client::ClientInfo;
pub use track::TrackPayload;
pub use viewer::ViewerSession;
