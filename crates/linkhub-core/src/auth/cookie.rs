use std::fmt;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// An outgoing cookie with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            max_age: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// A cookie that tells the client to drop `name` at `path`.
    pub fn removal(name: impl Into<String>, path: impl Into<String>) -> Self {
        let mut cookie = Self::new(name, "");
        cookie.path = Some(path.into());
        cookie.max_age = Some(0);
        cookie
    }

    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }
}

/// Renders the `Set-Cookie` header value. The value is percent-encoded.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, encode_value(&self.value))?;
        if let Some(ref path) = self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }
        Ok(())
    }
}

/// Where session cookies are read from and written to.
pub trait CookieJar {
    /// Decoded value of the cookie `name`, if the client sent one.
    fn get(&self, name: &str) -> Option<String>;

    /// Queue `cookie` for the response. Later reads in the same request see
    /// the new value, or nothing if it is a removal.
    fn set(&mut self, cookie: Cookie);
}

/// Cookies of one request/response exchange.
///
/// Incoming values come from `Cookie` request headers; everything passed to
/// [`CookieJar::set`] is kept for the `Set-Cookie` response headers.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    incoming: Vec<(String, String)>,
    outgoing: Vec<Cookie>,
}

impl RequestCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse any number of `Cookie` header values (`a=1; b=2`).
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let incoming = headers
            .into_iter()
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                Some((name.to_string(), decode_value(value)))
            })
            .collect();
        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// Cookies queued for the response, in the order they were set.
    pub fn outgoing(&self) -> &[Cookie] {
        &self.outgoing
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.outgoing.iter().map(Cookie::to_string).collect()
    }
}

impl CookieJar for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        if let Some(cookie) = self.outgoing.iter().rev().find(|c| c.name == name) {
            return (!cookie.is_removal()).then(|| cookie.value.clone());
        }
        self.incoming
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set(&mut self, cookie: Cookie) {
        self.outgoing.retain(|c| c.name != cookie.name);
        self.outgoing.push(cookie);
    }
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Percent-encode everything outside `cookie-octet`, plus `%` itself.
pub fn encode_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &b in value.as_bytes() {
        if is_cookie_octet(b) && b != b'%' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Reverse of [`encode_value`]. Malformed escapes are kept literally.
pub fn decode_value(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
