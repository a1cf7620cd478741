//! Cache key builders.

/// Prefix applied to every DocOne cache key.
const PREFIX: &str = "docone";

/// Gate progress of one browser session for one link.
pub fn gate_state(viewer: &str, link_code: &str) -> String {
    format!("{PREFIX}:gate:{viewer}:{link_code}")
}

/// Held while one browser session is being admitted to one link.
pub fn admission_lock(viewer: &str, link_code: &str) -> String {
    format!("{PREFIX}:admit:{viewer}:{link_code}")
}
