//! Authentication: password accounts with JWT sessions
//!
//! - `jwt`: HS256 token encoding/decoding
//! - `session`: the `session` cookie carrying the token for browser clients
//! - `middleware`: `require_auth`, validating Bearer header or cookie
//! - `extractor`: `AuthUser`, the handler-side identity

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod session;
