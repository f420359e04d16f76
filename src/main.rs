use std::path::PathBuf;

use clap::{Parser, Subcommand};

use afterglow_sync::{policy, service, JsonFileStore, SyncPhase, SyncStatus, WebDAVConfig};

#[derive(Parser)]
#[command(
    name = "afterglow-sync",
    about = "Back up and restore Afterglow habit data over WebDAV"
)]
struct Cli {
    /// WebDAV server base URL (overrides AFTERGLOW_WEBDAV_URL)
    #[arg(long)]
    url: Option<String>,

    /// Username for HTTP Basic auth (overrides AFTERGLOW_WEBDAV_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Password for HTTP Basic auth (overrides AFTERGLOW_WEBDAV_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Relay all requests through this CORS proxy endpoint
    #[arg(long)]
    proxy_url: Option<String>,

    /// Keep at most this many backups on the server
    #[arg(long)]
    max_backups: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a new timestamped backup from the local snapshot file
    Backup {
        #[arg(long, default_value = "habits.json")]
        snapshot: PathBuf,
    },
    /// List backups on the server, newest first
    List,
    /// Download a backup into the local snapshot file, replacing it
    Restore {
        filename: String,
        #[arg(long, default_value = "habits.json")]
        snapshot: PathBuf,
    },
    /// Delete a named backup from the server
    Delete { filename: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = WebDAVConfig::from_env()?;

    if let Some(url) = cli.url {
        config.server_url = url;
    }
    if let Some(username) = cli.username {
        config.username = username;
    }
    if let Some(password) = cli.password {
        config.password = password;
    }
    if let Some(proxy_url) = cli.proxy_url {
        config.use_proxy = true;
        config.proxy_url = Some(proxy_url);
    }
    if let Some(max_backups) = cli.max_backups {
        config.max_backups = Some(max_backups);
    }

    match cli.command {
        Command::Backup { snapshot } => {
            let store = JsonFileStore::new(snapshot);
            let outcome = service::backup_from_store(&config, &store).await?;
            println!("Backed up as {}", outcome.filename);
            for pruned in outcome.pruned {
                println!("Pruned {}", pruned);
            }
        }
        Command::List => {
            let filenames = service::list_backups(&config).await?;
            if filenames.is_empty() {
                println!("No backups found.");
            }
            for filename in filenames {
                match policy::timestamp_of(&filename) {
                    Some(instant) => println!("{}  ({} UTC)", filename, instant.format("%Y-%m-%d %H:%M:%S")),
                    None => println!("{}", filename),
                }
            }
        }
        Command::Restore { filename, snapshot } => {
            let store = JsonFileStore::new(&snapshot);
            match service::restore_into_store(&config, &filename, &store).await {
                Ok(()) => println!("Restored {} into {}", filename, snapshot.display()),
                Err(e) => {
                    let status = SyncStatus::for_error(&e);
                    if status.phase == SyncPhase::Idle {
                        println!("{}", status.message);
                    } else {
                        return Err(e.into());
                    }
                }
            }
        }
        Command::Delete { filename } => {
            service::delete_backup(&config, &filename).await?;
            println!("Deleted {}", filename);
        }
    }

    Ok(())
}
