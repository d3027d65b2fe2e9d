//! Middleware for FreshSaver.
//!
//! - `token_auth` - bearer token verification; resolves the request's `Caller`

mod token_auth;

pub use token_auth::{identify_caller, verify_token, Claims};
