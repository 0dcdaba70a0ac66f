use serde::Serialize;

use super::cookie::{Cookie, CookieJar, SameSite};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "linkhub-session";

/// Session lifetime: 7 days.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

const SESSION_COOKIE_PATH: &str = "/";

/// Who the current request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated(String),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated(name) => Some(name),
            AuthStatus::Anonymous => None,
        }
    }
}

impl Serialize for AuthStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            is_authenticated: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            username: Option<&'a str>,
        }

        Wire {
            is_authenticated: self.is_authenticated(),
            username: self.username(),
        }
        .serialize(serializer)
    }
}

/// Issues, reads and clears the session cookie.
///
/// The cookie value is the bare username. Nothing signs it, so a client that
/// sets the cookie by hand is treated as logged in. Expiry is left to the
/// client's cookie store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionGate {
    secure: bool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark issued cookies `Secure`.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn create(&self, jar: &mut impl CookieJar, username: &str) {
        let mut cookie = Cookie::new(SESSION_COOKIE_NAME, username);
        cookie.path = Some(SESSION_COOKIE_PATH.to_string());
        cookie.max_age = Some(SESSION_MAX_AGE_SECS);
        cookie.http_only = true;
        cookie.secure = self.secure;
        cookie.same_site = Some(SameSite::Lax);
        jar.set(cookie);
    }

    pub fn read(&self, jar: &impl CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE_NAME).filter(|v| !v.is_empty())
    }

    pub fn clear(&self, jar: &mut impl CookieJar) {
        jar.set(Cookie::removal(SESSION_COOKIE_NAME, SESSION_COOKIE_PATH));
    }

    pub fn status(&self, jar: &impl CookieJar) -> AuthStatus {
        match self.read(jar) {
            Some(username) => AuthStatus::Authenticated(username),
            None => AuthStatus::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RequestCookies;

    #[test]
    fn test_create_then_read() {
        let gate = SessionGate::new();
        let mut jar = RequestCookies::new();
        assert_eq!(gate.status(&jar), AuthStatus::Anonymous);

        gate.create(&mut jar, "alice");
        assert_eq!(gate.status(&jar), AuthStatus::Authenticated("alice".to_string()));
        assert_eq!(
            jar.set_cookie_headers(),
            ["linkhub-session=alice; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"]
        );
    }

    #[test]
    fn test_clear_then_read() {
        let gate = SessionGate::new();
        let mut jar = RequestCookies::from_headers(["linkhub-session=alice"]);
        assert_eq!(gate.read(&jar).as_deref(), Some("alice"));

        gate.clear(&mut jar);
        assert_eq!(gate.status(&jar), AuthStatus::Anonymous);
        assert_eq!(jar.set_cookie_headers(), ["linkhub-session=; Path=/; Max-Age=0"]);
    }

    #[test]
    fn test_empty_cookie_is_anonymous() {
        let jar = RequestCookies::from_headers(["linkhub-session="]);
        assert_eq!(SessionGate::new().status(&jar), AuthStatus::Anonymous);
    }

    #[test]
    fn test_secure_flag() {
        let gate = SessionGate::new().with_secure(true);
        let mut jar = RequestCookies::new();
        gate.create(&mut jar, "alice");
        assert!(jar.outgoing()[0].secure);
        assert!(jar.set_cookie_headers()[0].contains("; Secure"));
    }

    #[test]
    fn test_username_round_trips_through_headers() {
        let gate = SessionGate::new();
        let mut issued = RequestCookies::new();
        gate.create(&mut issued, "bob smith; x");

        // What a browser would send back: name=value without attributes.
        let header = issued.set_cookie_headers()[0]
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let next = RequestCookies::from_headers([header.as_str()]);
        assert_eq!(gate.read(&next).as_deref(), Some("bob smith; x"));
    }

    #[test]
    fn test_auth_status_accessors() {
        let status = AuthStatus::Authenticated("alice".to_string());
        assert!(status.is_authenticated());
        assert_eq!(status.username(), Some("alice"));
        assert_eq!(AuthStatus::Anonymous.username(), None);
    }
}
