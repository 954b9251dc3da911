//! Bearer token encoding, decoding, and the typed claim set.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claim, ClaimSet, Claims, Identity, WireClaim};
pub use decoder::JwtDecoder;
pub use encoder::{BearerToken, JwtEncoder};
