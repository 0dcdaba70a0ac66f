use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::config::Config;

use super::CredentialStore;

/// Username seeded into a fresh users file.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password seeded into a fresh users file.
///
/// Insecure by default: anyone who knows this project can log in until the
/// operator edits `data/users.txt`. Passwords are stored and compared in
/// plain text.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Contents written when the users file does not exist yet.
pub(crate) fn seed_contents() -> String {
    format!("{}:{}\n", DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
}

/// `username:password` pairs, one per line.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    users_file: PathBuf,
}

impl FileCredentialStore {
    pub fn new(users_file: impl Into<PathBuf>) -> Self {
        Self {
            users_file: users_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.users_file())
    }

    pub fn users_file(&self) -> &Path {
        &self.users_file
    }

    fn seed(&self) -> io::Result<HashMap<String, String>> {
        if let Some(parent) = self.users_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.users_file, seed_contents())?;
        warn!(
            path = %self.users_file.display(),
            username = DEFAULT_ADMIN_USERNAME,
            "Created users file with the default admin credential; change it"
        );
        Ok(parse_users(&seed_contents()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.users_file) {
            Ok(contents) => parse_users(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.seed().unwrap_or_else(|e| {
                error!(path = %self.users_file.display(), error = %e, "Failed to seed users file");
                HashMap::new()
            }),
            Err(e) => {
                error!(path = %self.users_file.display(), error = %e, "Failed to read users file");
                HashMap::new()
            }
        }
    }
}

/// Parse `username:password` lines. Later duplicates win.
pub fn parse_users(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (username, password) = line.split_once(':')?;
            let (username, password) = (username.trim(), password.trim());
            if username.is_empty() || password.is_empty() {
                return None;
            }
            Some((username.to_string(), password.to_string()))
        })
        .collect()
}
