//! Shareable links and their settings.

pub mod changes;
pub mod model;

pub use changes::LinkChanges;
pub use model::{CreateLink, ShareableLink};
