//! Error type shared by the decoder, the event sources and device discovery.

use std::io;

/// Everything that can go wrong between the device file and the callbacks.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No input device reports the expected name.
    #[error("no input device named '{name}'")]
    DeviceNotFound { name: String },

    /// The stream broke the fixed-size record contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// End of stream on the device (unplugged, remote closed).
    #[error("device disconnected")]
    DeviceDisconnected,

    /// Slot select outside the registry.
    #[error("slot {slot} out of range (device has {slots} slots)")]
    IndexOutOfRange { slot: i32, slots: usize },

    #[error("touch polling thread panicked")]
    WorkerPanicked,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Ssh(#[from] ssh2::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
