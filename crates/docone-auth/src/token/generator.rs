//! URL-safe random tokens drawn from the operating system RNG.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Entropy of a link code in bytes.
pub const LINK_CODE_BYTES: usize = 16;
/// Entropy of an analytics session id in bytes.
pub const SESSION_ID_BYTES: usize = 32;
/// Entropy of a viewer cookie token in bytes.
pub const VIEWER_TOKEN_BYTES: usize = 32;

/// Generates unguessable tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// `len` random bytes encoded as unpadded URL-safe base64.
    pub fn random_token(len: usize) -> String {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// A public link code.
    pub fn link_code() -> String {
        Self::random_token(LINK_CODE_BYTES)
    }

    /// A viewing session correlation id.
    pub fn session_id() -> String {
        Self::random_token(SESSION_ID_BYTES)
    }

    /// A browser session identifier for the viewer cookie.
    pub fn viewer_token() -> String {
        Self::random_token(VIEWER_TOKEN_BYTES)
    }
}

/// Supplies candidate link codes to the link registry.
pub trait CodeSource: Send + Sync + std::fmt::Debug + 'static {
    /// Produce the next candidate code.
    fn next_code(&self) -> String;
}

/// [`CodeSource`] backed by [`TokenGenerator::link_code`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn next_code(&self) -> String {
        TokenGenerator::link_code()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_link_code_is_url_safe() {
        let code = TokenGenerator::link_code();
        // 16 bytes -> 22 base64 characters without padding.
        assert_eq!(code.len(), 22);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_session_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1000).map(|_| TokenGenerator::session_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.len() == 43));
    }
}
