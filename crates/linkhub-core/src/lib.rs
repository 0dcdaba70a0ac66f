//! LinkHub core: a personal link dashboard backed by flat files.
//!
//! - `store`: the links file, uploaded icons and the users file
//! - `auth`: the cookie session gate
//! - `actions`: login, logout, list, add, delete and auth status
//! - `config`: paths and listen settings from the environment

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use actions::{IconUpload, LinkHub, LoginForm, NewLink};
pub use auth::{AuthStatus, CookieJar, RequestCookies, SessionGate};
pub use config::Config;
pub use error::{FieldErrors, HubError, HubResult};
pub use models::LinkRecord;
pub use store::{CredentialStore, DeleteOutcome, LinkStore, StorageLayout};
