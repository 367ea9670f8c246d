//! JWT encoding and decoding with claims management.

pub mod authority;
pub mod claims;
pub mod decoder;
pub mod encoder;

pub use authority::{TokenAuthority, TokenPair};
pub use claims::{AuxiliaryClaims, Claims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
