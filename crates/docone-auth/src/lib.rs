//! # docone-auth
//!
//! Credential and token primitives for DocOne.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing and verification of link passwords
//! - `token` — URL-safe random tokens (link codes, session ids, viewer cookies)
//! - `jwt` — owner bearer token encoding and validation
//! - `gate` — per-browser, per-link gate state storage

pub mod gate;
pub mod jwt;
pub mod password;
pub mod token;

pub use gate::{CacheGateStore, GateStore};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
pub use token::{CodeSource, RandomCodeSource, TokenGenerator};
