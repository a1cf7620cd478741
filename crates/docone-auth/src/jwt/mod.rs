//! Owner bearer tokens (HS256).

mod claims;
mod decoder;
mod encoder;

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
