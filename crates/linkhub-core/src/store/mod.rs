//! Flat-file persistence for links, icons and credentials.
//!
//! This module provides:
//! - `LinkStore` / `CredentialStore`: the storage seams the action layer uses
//! - `FileLinkStore` / `FileCredentialStore`: the on-disk implementations
//! - `MemoryLinkStore` / `MemoryCredentialStore`: in-process stand-ins for tests
//! - `StorageLayout`: one-time creation of directories and seed files
//!
//! Nothing here locks. Two appends, or an append racing a delete rewrite, can
//! interleave on disk and lose an update. That is accepted for a single-admin
//! dashboard.

pub mod credentials;
pub mod layout;
pub mod links;
pub mod memory;

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::models::LinkRecord;

pub use credentials::{FileCredentialStore, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
pub use layout::StorageLayout;
pub use links::FileLinkStore;
pub use memory::{MemoryCredentialStore, MemoryLinkStore};

/// Public URL prefix of uploaded icons.
pub const IMAGES_PREFIX: &str = "/images/";

/// Host of the remote placeholder images used by older records.
const PLACEHOLDER_HOST: &str = "placehold.co";

/// Result of [`LinkStore::delete_by_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(LinkRecord),
    NotFound,
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }

    /// Icon of the removed record, if it had one.
    pub fn icon_path(&self) -> Option<&str> {
        match self {
            DeleteOutcome::Deleted(record) if record.has_icon() => Some(&record.icon_path),
            _ => None,
        }
    }
}

/// Owner of the links file and the uploaded image directory.
pub trait LinkStore: Send + Sync {
    /// All records in insertion order. Never fails: read errors yield an
    /// empty list.
    fn list(&self) -> Vec<LinkRecord>;

    /// Add one record at the end without touching existing ones.
    fn append(&self, record: &LinkRecord) -> io::Result<()>;

    /// Remove the record with `id` and persist the survivors.
    fn delete_by_id(&self, id: &str) -> io::Result<DeleteOutcome>;

    /// Best-effort removal of a managed icon. Returns whether a file was
    /// actually removed.
    fn delete_icon_file(&self, icon_path: &str) -> bool;

    /// Store icon bytes under `file_name` and return the public path.
    fn save_uploaded_file(&self, bytes: &[u8], file_name: &str) -> io::Result<String>;
}

/// Read-only source of login credentials.
pub trait CredentialStore: Send + Sync {
    /// Username → password. Empty when the source can't be read.
    fn load(&self) -> HashMap<String, String>;
}

/// File name inside the image directory that `icon_path` refers to, or
/// `None` if the path is not a managed upload.
pub fn managed_icon_name(icon_path: &str) -> Option<&str> {
    if icon_path.is_empty() || icon_path.contains(PLACEHOLDER_HOST) {
        return None;
    }
    let rest = icon_path.strip_prefix(IMAGES_PREFIX)?;
    Path::new(rest).file_name().and_then(|name| name.to_str())
}

/// Public path for an icon stored as `file_name`.
pub fn public_icon_path(file_name: &str) -> String {
    format!("{}{}", IMAGES_PREFIX, file_name)
}

/// Reject upload names that would land outside the image directory.
pub(crate) fn check_upload_name(file_name: &str) -> io::Result<()> {
    let plain = Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
    if plain && !file_name.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a plain file name: {}", file_name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_icon_name() {
        assert_eq!(managed_icon_name("/images/1-mail.png"), Some("1-mail.png"));
        assert_eq!(managed_icon_name("/images/sub/../x.png"), Some("x.png"));
    }

    #[test]
    fn test_managed_icon_name_rejects_unmanaged() {
        assert_eq!(managed_icon_name(""), None);
        assert_eq!(managed_icon_name("/images/"), None);
        assert_eq!(managed_icon_name("/images/.."), None);
        assert_eq!(managed_icon_name("/other/x.png"), None);
        assert_eq!(managed_icon_name("https://placehold.co/64x64.png"), None);
        assert_eq!(managed_icon_name("/images/placehold.co.png"), None);
    }

    #[test]
    fn test_check_upload_name() {
        assert!(check_upload_name("1700-mail.png").is_ok());
        assert!(check_upload_name("../evil.png").is_err());
        assert!(check_upload_name("a/b.png").is_err());
        assert!(check_upload_name("..").is_err());
        assert!(check_upload_name("").is_err());
    }

    #[test]
    fn test_delete_outcome_icon_path() {
        let with_icon = DeleteOutcome::Deleted(LinkRecord::new("1", "A", "#", "/images/a.png"));
        assert_eq!(with_icon.icon_path(), Some("/images/a.png"));

        let without_icon = DeleteOutcome::Deleted(LinkRecord::new("1", "A", "#", ""));
        assert!(without_icon.is_deleted());
        assert_eq!(without_icon.icon_path(), None);

        assert!(!DeleteOutcome::NotFound.is_deleted());
    }
}
