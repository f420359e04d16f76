//! WebDAV backup and restore core for the Afterglow habit tracker.
//!
//! The facade functions in [`service`] are the entry points: `backup`
//! writes the full habit snapshot to a self-hosted WebDAV server under a
//! timestamped filename, `list_backups` enumerates what is there,
//! `restore` fetches a chosen snapshot back, and `delete_backup` removes
//! one. Requests go either straight at the server or through a CORS-relay
//! proxy, selected per call from the [`config::WebDAVConfig`].

pub mod config;
pub mod errors;
pub mod models;
pub mod policy;
pub mod protocol;
pub mod service;
pub mod store;
pub mod transport;
pub mod xml_parser;

pub use config::WebDAVConfig;
pub use errors::SyncError;
pub use models::{BackupOutcome, SyncPhase, SyncStatus};
pub use protocol::WebDAVClient;
pub use service::{
    backup, backup_from_store, delete_backup, list_backups, restore, restore_into_store,
};
pub use store::{HabitStore, JsonFileStore, Snapshot};
pub use transport::{
    select_transport, DirectTransport, HttpTransport, ProxyTransport, PROXY_DISCOVERY_HEADER,
};
