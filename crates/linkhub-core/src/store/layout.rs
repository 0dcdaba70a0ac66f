use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;

use super::credentials::seed_contents;

/// Creates the directories and seed files the stores expect.
///
/// Idempotent: existing files are never overwritten. Call once at start-up.
pub struct StorageLayout;

impl StorageLayout {
    pub fn ensure_ready(config: &Config) -> io::Result<()> {
        for dir in [config.data_dir(), config.public_data_dir(), config.images_dir()] {
            fs::create_dir_all(&dir)?;
        }

        if create_if_missing(&config.users_file(), seed_contents().as_bytes())? {
            warn!(
                path = %config.users_file().display(),
                "Seeded users file with the default admin credential; change it"
            );
        }
        if create_if_missing(&config.links_file(), b"")? {
            info!(path = %config.links_file().display(), "Created empty links file");
        }
        Ok(())
    }
}

/// Write `contents` to `path` only if it does not exist. Returns whether the
/// file was created.
fn create_if_missing(path: &Path, contents: &[u8]) -> io::Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(contents)?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}
