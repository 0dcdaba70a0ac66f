use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::LinkRecord;

use super::{
    check_upload_name, managed_icon_name, public_icon_path, CredentialStore, DeleteOutcome,
    LinkStore, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Link store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    records: Mutex<Vec<LinkRecord>>,
    icons: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<LinkRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            icons: Mutex::default(),
        }
    }

    /// Bytes of an uploaded icon, keyed by its file name.
    pub fn icon(&self, file_name: &str) -> Option<Vec<u8>> {
        lock(&self.icons).get(file_name).cloned()
    }

    pub fn icon_count(&self) -> usize {
        lock(&self.icons).len()
    }
}

impl LinkStore for MemoryLinkStore {
    fn list(&self) -> Vec<LinkRecord> {
        lock(&self.records).clone()
    }

    fn append(&self, record: &LinkRecord) -> io::Result<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> io::Result<DeleteOutcome> {
        let mut records = lock(&self.records);
        let Some(deleted) = records.iter().find(|r| r.id == id).cloned() else {
            return Ok(DeleteOutcome::NotFound);
        };
        records.retain(|r| r.id != id);
        Ok(DeleteOutcome::Deleted(deleted))
    }

    fn delete_icon_file(&self, icon_path: &str) -> bool {
        match managed_icon_name(icon_path) {
            Some(name) => lock(&self.icons).remove(name).is_some(),
            None => false,
        }
    }

    fn save_uploaded_file(&self, bytes: &[u8], file_name: &str) -> io::Result<String> {
        check_upload_name(file_name)?;
        lock(&self.icons).insert(file_name.to_string(), bytes.to_vec());
        Ok(public_icon_path(file_name))
    }
}

/// Fixed credential map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// Only the default admin, as a freshly seeded users file would hold.
    pub fn seeded() -> Self {
        Self::default().with_user(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
    }

    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> HashMap<String, String> {
        self.users.clone()
    }
}
