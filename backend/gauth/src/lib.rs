//! Google service-account authentication.
//!
//! Parses service-account keys and mints cached OAuth access tokens through
//! the RS256 JWT-bearer flow shared by the Google REST APIs.

mod key;
mod token;

pub use key::{normalize_private_key, KeyError, ServiceAccountKey};
pub use token::{scopes, AuthError, TokenProvider, TOKEN_ENDPOINT};
