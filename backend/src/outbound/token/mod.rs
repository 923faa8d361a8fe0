//! Bearer token adapters.

mod jwt;

pub use jwt::{DEFAULT_TOKEN_TTL, JwtTokenService};
