use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Separator between fields of a stored link line.
pub const FIELD_SEPARATOR: &str = " | ";

/// Name given to a record whose line has no name field.
pub const UNTITLED_NAME: &str = "Untitled Link";

/// URL given to a record whose line has no url field.
pub const BROKEN_URL: &str = "#";

/// A single bookmark tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Empty when the tile uses the placeholder icon.
    #[serde(default)]
    pub icon_path: String,
}

impl LinkRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        icon_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            icon_path: icon_path.into(),
        }
    }

    pub fn has_icon(&self) -> bool {
        !self.icon_path.is_empty()
    }

    /// Parse one stored line. Returns `None` for blank lines.
    ///
    /// Short lines never fail: missing fields fall back to a generated id,
    /// [`UNTITLED_NAME`], [`BROKEN_URL`] and an empty icon path.
    pub fn parse_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let mut parts = line.split(FIELD_SEPARATOR).map(str::trim);
        let mut next = || parts.next().filter(|p| !p.is_empty()).map(str::to_string);

        let id = next().unwrap_or_else(fallback_id);
        let name = next().unwrap_or_else(|| UNTITLED_NAME.to_string());
        let url = next().unwrap_or_else(|| BROKEN_URL.to_string());
        let icon_path = next().unwrap_or_default();

        Some(Self {
            id,
            name,
            url,
            icon_path,
        })
    }

    /// Serialize to a single line, without the trailing newline.
    pub fn to_line(&self) -> String {
        [&self.id, &self.name, &self.url, &self.icon_path]
            .iter()
            .map(|field| flatten_field(field))
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }
}

/// Trim a field and fold line breaks into spaces so a record stays on one line.
fn flatten_field(field: &str) -> String {
    field
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fallback_id() -> String {
    let n = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("fallback-id-{}-{}", Utc::now().timestamp_millis(), n)
}

/// Hands out millisecond-timestamp ids that never repeat within a process.
///
/// Two calls in the same millisecond get consecutive values instead of the
/// same one.
#[derive(Debug, Default)]
pub struct LinkIdGenerator {
    last: AtomicU64,
}

impl LinkIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_full_line() {
        let record = LinkRecord::parse_line("17 | Mail | https://mail.example.com | /images/m.png")
            .unwrap();
        assert_eq!(
            record,
            LinkRecord::new("17", "Mail", "https://mail.example.com", "/images/m.png")
        );
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(LinkRecord::parse_line("").is_none());
        assert!(LinkRecord::parse_line("   \t ").is_none());
    }

    #[test]
    fn test_parse_short_line_uses_defaults() {
        let record = LinkRecord::parse_line("42 | Wiki").unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.name, "Wiki");
        assert_eq!(record.url, BROKEN_URL);
        assert_eq!(record.icon_path, "");
        assert!(!record.has_icon());
    }

    #[test]
    fn test_parse_missing_id_gets_fallback() {
        let record = LinkRecord::parse_line(" | Wiki | https://w.example").unwrap();
        assert!(record.id.starts_with("fallback-id-"));
        assert_eq!(record.url, "https://w.example");
    }

    #[test]
    fn test_parse_tolerates_crlf() {
        let record = LinkRecord::parse_line("1 | A | https://a.example | \r").unwrap();
        assert_eq!(record.icon_path, "");
    }

    #[test]
    fn test_to_line_with_empty_icon() {
        let record = LinkRecord::new("1", "Mail", "https://mail.example.com", "");
        assert_eq!(record.to_line(), "1 | Mail | https://mail.example.com | ");
        assert_eq!(LinkRecord::parse_line(&record.to_line()).unwrap(), record);
    }

    #[test]
    fn test_to_line_flattens_line_breaks() {
        let record = LinkRecord::new("1", "Two\nLines", "https://a.example", "");
        let line = record.to_line();
        assert!(!line.contains('\n'));
        assert_eq!(LinkRecord::parse_line(&line).unwrap().name, "Two Lines");
    }

    #[test]
    fn test_id_generator_is_unique_and_increasing() {
        let ids = LinkIdGenerator::new();
        let generated: Vec<u64> = (0..1000).map(|_| ids.next_id().parse().unwrap()).collect();
        assert!(generated.windows(2).all(|w| w[0] < w[1]));
        let unique: HashSet<_> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
    }
}
