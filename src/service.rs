use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::WebDAVConfig;
use crate::errors::SyncError;
use crate::models::BackupOutcome;
use crate::policy;
use crate::protocol::WebDAVClient;
use crate::store::{HabitStore, Snapshot};

/// Writes a snapshot to the server as a new timestamped backup, then
/// prunes backups beyond `max_backups`.
///
/// Fails at whichever step errors; a pruning failure after a successful
/// write does not invalidate the backup and is only logged.
pub async fn backup<T: Serialize>(
    config: &WebDAVConfig,
    snapshot: &T,
) -> Result<BackupOutcome, SyncError> {
    config.validate()?;
    let client = WebDAVClient::new(config.clone())?;

    client.ensure_collection().await?;

    let filename = policy::backup_filename();
    client.put_object(&filename, snapshot).await?;
    info!("wrote backup {}", filename);

    let pruned = match prune_excess(&client, config).await {
        Ok(pruned) => pruned,
        Err(e) => {
            warn!("retention pruning failed after successful backup: {}", e);
            Vec::new()
        }
    };

    Ok(BackupOutcome { filename, pruned })
}

/// Returns the backup filenames on the server, newest first.
pub async fn list_backups(config: &WebDAVConfig) -> Result<Vec<String>, SyncError> {
    config.validate()?;
    let client = WebDAVClient::new(config.clone())?;

    let mut filenames = client.list_objects().await?;
    policy::sort_newest_first(&mut filenames);
    Ok(filenames)
}

/// Fetches one backup and returns the deserialized snapshot. The caller is
/// responsible for validating its shape before applying it locally.
pub async fn restore<T: DeserializeOwned>(
    config: &WebDAVConfig,
    filename: &str,
) -> Result<T, SyncError> {
    config.validate()?;
    let client = WebDAVClient::new(config.clone())?;

    let snapshot = client.get_object(filename).await?;
    info!("restored backup {}", filename);
    Ok(snapshot)
}

/// Removes one named backup from the server.
pub async fn delete_backup(config: &WebDAVConfig, filename: &str) -> Result<(), SyncError> {
    config.validate()?;
    let client = WebDAVClient::new(config.clone())?;

    client.delete_object(filename).await?;
    info!("deleted backup {}", filename);
    Ok(())
}

/// Backs up whatever the local store currently holds.
pub async fn backup_from_store(
    config: &WebDAVConfig,
    store: &dyn HabitStore,
) -> Result<BackupOutcome, SyncError> {
    let snapshot = store.load_all_habits()?;
    backup(config, &snapshot).await
}

/// Restores a backup straight into the local store, replacing its
/// contents. Destructive; the caller confirms with the user first.
pub async fn restore_into_store(
    config: &WebDAVConfig,
    filename: &str,
    store: &dyn HabitStore,
) -> Result<(), SyncError> {
    let snapshot: Snapshot = restore(config, filename).await?;
    store.replace_all_habits(snapshot)?;
    Ok(())
}

async fn prune_excess(
    client: &WebDAVClient,
    config: &WebDAVConfig,
) -> Result<Vec<String>, SyncError> {
    let Some(max_backups) = config.max_backups else {
        return Ok(Vec::new());
    };

    let mut filenames = client.list_objects().await?;
    policy::sort_newest_first(&mut filenames);

    let mut pruned = Vec::new();
    for filename in policy::excess_backups(&filenames, max_backups) {
        match client.delete_object(&filename).await {
            Ok(()) => {
                info!("pruned old backup {}", filename);
                pruned.push(filename);
            }
            // Best-effort: a leftover backup is harmless, keep going.
            Err(e) => warn!("failed to prune old backup {}: {}", filename, e),
        }
    }

    Ok(pruned)
}
