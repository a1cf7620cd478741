//! Random token generation.

pub mod generator;

pub use generator::{CodeSource, RandomCodeSource, TokenGenerator};
