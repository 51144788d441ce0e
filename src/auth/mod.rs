//! Identity gate
//!
//! Issues and verifies the bearer tokens that carry a customer identifier.

mod token;

pub use token::{AuthError, Claims, TokenService, AUTH_SCHEME};
