use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// A full, self-contained serialization of all habit data at a point in
/// time. The sync core never inspects its internal shape.
pub type Snapshot = serde_json::Value;

/// The local-persistence collaborator. The sync core reaches storage only
/// through this seam; how habits are actually persisted is not its concern.
pub trait HabitStore: Send + Sync {
    fn load_all_habits(&self) -> Result<Snapshot>;
    fn replace_all_habits(&self, snapshot: Snapshot) -> Result<()>;
}

/// File-backed store: the whole habit collection as one JSON document on
/// disk. Backs the CLI; an embedded database would implement the same
/// trait in the full application.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HabitStore for JsonFileStore {
    fn load_all_habits(&self) -> Result<Snapshot> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read snapshot file {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("snapshot file {} is not valid JSON", self.path.display()))
    }

    fn replace_all_habits(&self, snapshot: Snapshot) -> Result<()> {
        let contents = serde_json::to_string_pretty(&snapshot)
            .context("failed to serialize snapshot")?;

        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write snapshot file {}", self.path.display()))
    }
}
