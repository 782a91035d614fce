//! # Command-Line Interface Module
//!
//! Clap definitions for the `listenlog` binary.
//!
//! ## Examples
//!
//! ```bash
//! listenlog list --json
//! listenlog add --song-id abc --title Foo --artist Bar --service Spotify
//! listenlog remove --key serviceName --value Spotify
//! listenlog clear
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser, Debug)]
#[command(name = "listenlog")]
#[command(about = "Listenlog: keep track of what you listened to, across streaming services")]
#[command(version)]
pub struct Args {
    /// History database to use instead of the platform default
    #[arg(long, global = true, env = "LISTENLOG_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, global = true, env = "LISTENLOG_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the listening history, most recent first
    List {
        /// Print entries as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Record a play event
    ///
    /// Consecutive plays of the same song on the same service are recorded
    /// once. Nothing is recorded when history is disabled in the settings.
    Add {
        /// Track identifier within its streaming service
        #[arg(long)]
        song_id: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        album: String,
        #[arg(long, default_value = "")]
        art_url: String,
        /// Streaming service the track was played on
        #[arg(long)]
        service: String,
        /// Time of the play event; defaults to the current UNIX time
        #[arg(long)]
        time: Option<String>,
    },

    /// Remove every entry whose column matches a value
    ///
    /// Columns: id, songUniqueId, songTitle, artist, album, artUrl,
    /// serviceName, time
    Remove {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },

    /// Delete the whole listening history
    Clear,

    /// Generate shell completions
    ///
    /// Usage: listenlog completion bash > ~/.local/share/bash-completion/completions/listenlog
    Completion {
        shell: Shell,
    },

    /// List recorded service names for completion (hidden command)
    #[command(hide = true)]
    CompleteServices,
}
