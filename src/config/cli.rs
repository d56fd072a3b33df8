use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Default)]
#[command(name = "mt-touch")]
#[command(about = "Decode multitouch (Type B) input into press, move and release events")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Touch device path (skips discovery by name)
    #[arg(long)]
    pub device: Option<String>,

    /// Device name to look for in /sys/class/input
    #[arg(long)]
    pub device_name: Option<String>,

    /// Number of multitouch slots
    #[arg(long)]
    pub slots: Option<usize>,

    /// Size of one input_event record in bytes (16 or 24)
    #[arg(long)]
    pub event_size: Option<usize>,

    /// Read from a remote device over SSH (IP or hostname)
    #[arg(long, env = "MTTOUCH_HOST")]
    pub host: Option<String>,

    /// SSH user on the remote host
    #[arg(long)]
    pub user: Option<String>,

    /// SSH key path for authentication
    #[arg(long)]
    pub key_path: Option<String>,

    /// SSH password (if set, key_path is ignored)
    #[arg(long, env = "MTTOUCH_PASSWORD")]
    pub password: Option<String>,

    /// How long a read may wait before re-checking for shutdown
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Path to config file
    #[arg(long, env = "MTTOUCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print press, move and release events (default)
    Watch,
    /// Dump raw input events for debugging
    Dump,
}
