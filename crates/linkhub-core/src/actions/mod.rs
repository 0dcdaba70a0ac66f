//! The operations the dashboard offers: login, logout, list, add, delete and
//! auth status.
//!
//! `LinkHub` ties the stores and the session gate together. It only talks to
//! storage through the `LinkStore` and `CredentialStore` traits, so tests run
//! it against the in-memory stores.

pub mod validate;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::{AuthStatus, CookieJar, SessionGate};
use crate::config::Config;
use crate::error::{HubError, HubResult};
use crate::models::{LinkIdGenerator, LinkRecord};
use crate::store::{
    CredentialStore, DeleteOutcome, FileCredentialStore, FileLinkStore, LinkStore,
};

pub use validate::{IconUpload, LoginForm, NewLink, ALLOWED_ICON_TYPES, MAX_ICON_BYTES};

pub struct LinkHub {
    links: Arc<dyn LinkStore>,
    credentials: Arc<dyn CredentialStore>,
    sessions: SessionGate,
    ids: LinkIdGenerator,
}

impl LinkHub {
    pub fn new(
        links: Arc<dyn LinkStore>,
        credentials: Arc<dyn CredentialStore>,
        sessions: SessionGate,
    ) -> Self {
        Self {
            links,
            credentials,
            sessions,
            ids: LinkIdGenerator::new(),
        }
    }

    /// File-backed hub laid out under `config.root`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(FileLinkStore::from_config(config)),
            Arc::new(FileCredentialStore::from_config(config)),
            SessionGate::new().with_secure(config.secure_cookies),
        )
    }

    pub fn sessions(&self) -> &SessionGate {
        &self.sessions
    }

    /// Check credentials and start a session.
    ///
    /// Unknown user and wrong password fail the same way.
    pub fn login(&self, jar: &mut impl CookieJar, form: &LoginForm) -> HubResult<()> {
        form.validate()?;

        let users = self.credentials.load();
        match users.get(&form.username) {
            Some(password) if *password == form.password => {
                self.sessions.create(jar, &form.username);
                info!(username = %form.username, "User logged in");
                Ok(())
            }
            _ => {
                warn!(username = %form.username, "Failed login attempt");
                Err(HubError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&self, jar: &mut impl CookieJar) {
        if let Some(username) = self.sessions.read(&*jar) {
            info!(username = %username, "User logged out");
        }
        self.sessions.clear(jar);
    }

    pub fn auth_status(&self, jar: &impl CookieJar) -> AuthStatus {
        self.sessions.status(jar)
    }

    pub fn list_links(&self) -> Vec<LinkRecord> {
        self.links.list()
    }

    /// Validate and persist a new link, storing its icon first if one was
    /// uploaded. A failed icon save still adds the link, without an icon.
    pub fn add_link(&self, jar: &impl CookieJar, link: NewLink) -> HubResult<LinkRecord> {
        self.require_session(jar)?;
        link.validate()?;

        let id = self.ids.next_id();
        let icon_path = match link.icon.as_ref().filter(|icon| !icon.is_empty()) {
            Some(icon) => {
                let file_name = icon.stored_file_name(&id);
                match self.links.save_uploaded_file(&icon.bytes, &file_name) {
                    Ok(path) => path,
                    Err(e) => {
                        error!(file_name = %file_name, error = %e, "Error saving uploaded icon");
                        String::new()
                    }
                }
            }
            None => String::new(),
        };

        let record = LinkRecord::new(id, link.name.trim(), link.url.trim(), icon_path);
        if let Err(e) = self.links.append(&record) {
            error!(id = %record.id, error = %e, "Error adding link entry");
            if record.has_icon() {
                self.links.delete_icon_file(&record.icon_path);
            }
            return Err(HubError::storage("Failed to add link.", e));
        }

        info!(id = %record.id, name = %record.name, "Link added");
        Ok(record)
    }

    /// Remove a link and its uploaded icon.
    pub fn delete_link(&self, jar: &impl CookieJar, id: &str) -> HubResult<LinkRecord> {
        self.require_session(jar)?;

        match self.links.delete_by_id(id) {
            Ok(DeleteOutcome::Deleted(record)) => {
                if record.has_icon() {
                    self.links.delete_icon_file(&record.icon_path);
                }
                info!(id, "Link deleted");
                Ok(record)
            }
            Ok(DeleteOutcome::NotFound) => Err(HubError::NotFound(id.to_string())),
            Err(e) => {
                error!(id, error = %e, "Error deleting link");
                Err(HubError::storage(
                    "Failed to delete link due to a server error.",
                    e,
                ))
            }
        }
    }

    fn require_session(&self, jar: &impl CookieJar) -> HubResult<String> {
        self.sessions.read(jar).ok_or(HubError::Unauthorized)
    }
}
