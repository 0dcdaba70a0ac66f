//! Data models for LinkHub entities.
//!
//! - `LinkRecord`: one bookmark tile as stored in the links file
//! - `LinkIdGenerator`: collision-free timestamp ids for new records

pub mod link;

pub use link::{LinkIdGenerator, LinkRecord, BROKEN_URL, FIELD_SEPARATOR, UNTITLED_NAME};
