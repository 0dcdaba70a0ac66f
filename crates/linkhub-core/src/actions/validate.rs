use serde::Deserialize;
use url::{Host, Url};

use crate::error::{FieldErrors, HubResult};

/// Largest icon accepted, in bytes.
pub const MAX_ICON_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for icons.
pub const ALLOWED_ICON_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/svg+xml"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> HubResult<()> {
        let mut errors = FieldErrors::new();
        if self.username.is_empty() {
            errors.add("username", "Username is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

/// An uploaded icon as received from the client.
#[derive(Debug, Clone, Default)]
pub struct IconUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IconUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Name to store the icon under: `<prefix>-<base><.ext>`, with anything
    /// outside `[A-Za-z0-9_.-]` in the base replaced by `_`.
    pub fn stored_file_name(&self, prefix: &str) -> String {
        let original = self.file_name.rsplit(['/', '\\']).next().unwrap_or_default();
        let (base, extension) = match original.rfind('.') {
            Some(dot) if dot > 0 => (&original[..dot], &original[dot + 1..]),
            _ => (original, ""),
        };

        let base: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let extension: String = extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        match (base.is_empty(), extension.is_empty()) {
            (true, true) => prefix.to_string(),
            (false, true) => format!("{}-{}", prefix, base),
            (true, false) => format!("{}.{}", prefix, extension),
            (false, false) => format!("{}-{}.{}", prefix, base, extension),
        }
    }

    fn validate_into(&self, errors: &mut FieldErrors) {
        if self.bytes.len() > MAX_ICON_BYTES {
            errors.add("icon", "Icon must be less than 5MB");
        }
        let content_type = self.content_type.trim().to_ascii_lowercase();
        if !ALLOWED_ICON_TYPES.contains(&content_type.as_str()) {
            errors.add("icon", "Only JPEG, PNG, GIF, SVG images are allowed");
        }
    }
}

/// Input of the add-link action.
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub name: String,
    pub url: String,
    pub icon: Option<IconUpload>,
}

impl NewLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: IconUpload) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Check every field; an empty upload counts as no icon.
    pub fn validate(&self) -> HubResult<()> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Application name is required");
        } else if name.contains('|') {
            errors.add("name", "Application name cannot contain '|'");
        } else if name.contains(['\n', '\r']) {
            errors.add("name", "Application name must be a single line");
        }

        if !is_web_url(self.url.trim()) {
            errors.add("url", "Invalid URL format. Please include http:// or https://");
        }

        if let Some(icon) = self.icon.as_ref().filter(|i| !i.is_empty()) {
            icon.validate_into(&mut errors);
        }

        errors.into_result()
    }
}

/// `http://` or `https://` followed by a well-formed host, with no whitespace
/// or `|`.
pub fn is_web_url(url: &str) -> bool {
    if url.chars().any(|c| c.is_whitespace() || c.is_control() || c == '|') {
        return false;
    }
    // The scheme must be spelled out with both slashes and an authority after.
    let lower = url.to_ascii_lowercase();
    let Some(rest) = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
    else {
        return false;
    };
    if rest.starts_with(['/', '\\']) {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    match parsed.host() {
        Some(Host::Domain(domain)) => is_dns_name(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// Dot-separated labels of letters, digits, `-` and `_`. One trailing dot is
/// allowed.
fn is_dns_name(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}
