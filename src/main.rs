//! # Listenlog
//!
//! Command-line front-end for the listening history.
//!
//! ## Usage
//!
//! ```bash
//! listenlog add --song-id 4uLU6hMCjMI75M1A2tKUQC --title "Never Gonna Give You Up" \
//!     --artist "Rick Astley" --service Spotify
//! listenlog list
//! listenlog remove --key serviceName --value Spotify
//! listenlog clear
//! ```

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use listenlog::cli::{self, Command};
use listenlog::config::RuntimeConfig;
use listenlog::{completion, HistoryProjection, HistoryStore, ListeningHistoryEntry, Recorder};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Settings and an open store for commands that touch the history.
fn open_session(config_path: Option<&Path>, db: Option<&Path>) -> Result<(RuntimeConfig, HistoryStore)> {
    let config = RuntimeConfig::resolve(config_path, db)?;
    let store = HistoryStore::open_at(&config.db_path);
    if !store.is_open() {
        bail!("Could not open history database at {}", config.db_path.display());
    }
    Ok((config, store))
}

fn now() -> Result<String> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is set before the UNIX epoch")?;
    Ok(elapsed.as_secs().to_string())
}

fn print_entry(entry: &ListeningHistoryEntry) {
    let id = entry.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    println!(
        "{id:>6}  {}  {} - {} ({})  [{}]",
        entry.time, entry.artist, entry.song_title, entry.album, entry.service_name
    );
}

/// Initializes logging (`RUST_LOG=debug listenlog list`), parses arguments
/// and routes each command to the library.
fn main() -> Result<()> {
    env_logger::init();

    let cli::Args { db, config: config_path, command } = cli::Args::parse();
    let session = || open_session(config_path.as_deref(), db.as_deref());

    match command {
        Command::Completion { shell } => {
            completion::generate_completions(shell, &mut cli::Args::command())?;
        }
        Command::List { json } => {
            let (_, store) = session()?;
            let mut projection = HistoryProjection::new(store);
            projection.initialize();

            if json {
                println!("{}", serde_json::to_string_pretty(projection.entries())?);
            } else if projection.is_empty() {
                println!("Listening history is empty");
            } else {
                projection.iter().for_each(print_entry);
            }
        }
        Command::Add { song_id, title, artist, album, art_url, service, time } => {
            let time = match time {
                Some(time) => time,
                None => now()?,
            };
            let entry = ListeningHistoryEntry::new(song_id, title, artist, album, art_url, service, time);
            let (config, store) = session()?;

            let mut recorder = Recorder::new(HistoryProjection::new(store), config.history_enabled);
            recorder.initialize();

            match recorder.on_now_playing(entry) {
                Some(stored) => match stored.id {
                    Some(id) => println!("Recorded entry {id}"),
                    None => bail!("Failed to store listening history entry"),
                },
                None => println!("Nothing recorded"),
            }
        }
        Command::Remove { key, value } => {
            let (_, store) = session()?;
            let removed = store
                .remove_by_name(&key, &value)
                .with_context(|| format!("Failed to remove entries where {key} = {value:?}"))?;
            println!("Removed {removed} entries");
        }
        Command::Clear => {
            let (_, store) = session()?;
            let removed = store.clear().context("Failed to clear listening history")?;
            println!("Removed {removed} entries");
        }
        Command::CompleteServices => {
            let (_, store) = session()?;
            completion::print_service_completions(&store)?;
        }
    }

    Ok(())
}
