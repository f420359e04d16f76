use thiserror::Error;

/// Errors surfaced by the sync core. Every protocol failure carries the
/// offending HTTP status so the UI can report it verbatim.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to create backup directory: server returned status {status}")]
    DirectoryCreation { status: u16 },

    #[error("backup '{filename}' not found on server")]
    NotFound { filename: String },

    #[error("failed to read backup: server returned status {status}")]
    Read { status: u16 },

    #[error("failed to write backup: server returned status {status}")]
    Write { status: u16 },

    #[error("failed to list backups: server returned status {status}")]
    List { status: u16 },

    #[error("failed to delete backup: server returned status {status}")]
    Delete { status: u16 },

    #[error("could not parse server response: {details}")]
    Parse { details: String },

    #[error("incomplete WebDAV configuration: {details}")]
    ConfigIncomplete { details: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("local store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl SyncError {
    /// Whether this is the expected "no backup yet" first-run state rather
    /// than a genuine failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::DirectoryCreation { status }
            | SyncError::Read { status }
            | SyncError::Write { status }
            | SyncError::List { status }
            | SyncError::Delete { status } => Some(*status),
            _ => None,
        }
    }
}
