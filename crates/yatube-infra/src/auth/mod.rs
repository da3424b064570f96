//! Caller identity tokens.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
