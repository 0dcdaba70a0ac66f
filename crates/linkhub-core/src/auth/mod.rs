//! Authentication: the session cookie and the request cookie jar.
//!
//! This module provides:
//! - `SessionGate`: issues, reads and clears the `linkhub-session` cookie
//! - `AuthStatus`: Anonymous or Authenticated(username)
//! - `CookieJar` / `RequestCookies`: cookie access for one request
//!
//! Sessions are never stored server-side; the cookie is the session and
//! expires on the client after 7 days.

pub mod cookie;
pub mod session;

pub use cookie::{Cookie, CookieJar, RequestCookies, SameSite};
pub use session::{AuthStatus, SessionGate, SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS};
