//! Application configuration.
//!
//! Everything is resolved from environment variables (a `.env` file is loaded
//! by the binary before this runs):
//!
//! - `LINKHUB_ROOT`: base directory holding `data/` and `public/`
//! - `LINKHUB_HOST` / `LINKHUB_PORT`: listen address
//! - `LINKHUB_SECURE_COOKIES`: mark the session cookie `Secure`
//! - `LINKHUB_LOG_DIR`: also write a daily-rolling log file here
//!
//! On-disk layout under the root:
//!
//! ```text
//! data/users.txt
//! public/data/links.txt
//! public/images/
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the fallback data directory
const APP_NAME: &str = "linkhub";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

const USERS_FILE: &str = "users.txt";
const LINKS_FILE: &str = "links.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub secure_cookies: bool,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Build the config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let root = match lookup("LINKHUB_ROOT").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_root()?,
        };

        let port = match lookup("LINKHUB_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("LINKHUB_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            root,
            host: lookup("LINKHUB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            secure_cookies: lookup("LINKHUB_SECURE_COOKIES")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            log_dir: lookup("LINKHUB_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Config rooted at `root` with default network settings.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secure_cookies: false,
            log_dir: None,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    pub fn public_data_dir(&self) -> PathBuf {
        self.public_dir().join("data")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.public_dir().join("images")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join(USERS_FILE)
    }

    pub fn links_file(&self) -> PathBuf {
        self.public_data_dir().join(LINKS_FILE)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Current directory, or the platform data dir if that can't be read.
fn default_root() -> Result<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        return Ok(cwd);
    }
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
    Ok(data_dir.join(APP_NAME))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
