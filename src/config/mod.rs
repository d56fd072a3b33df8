mod cli;
mod file;

pub use cli::{Cli, Command};
pub use file::FileConfig;

use std::path::PathBuf;
use std::time::Duration;

use crate::device::DeviceProfile;
use crate::error::{Error, Result};
use crate::input::EventLayout;

const DEFAULT_READ_TIMEOUT_MS: u64 = 100;
const DEFAULT_SSH_USER: &str = "root";

/// Authentication method for SSH connection.
#[derive(Debug, Clone)]
pub enum Auth {
    Key(PathBuf),
    Password(String),
}

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub device: Option<String>,
    pub device_name: String,
    pub slots: usize,
    pub event_size: Option<usize>,
    pub host: Option<String>,
    pub user: String,
    pub key_path: Option<String>,
    pub password: Option<String>,
    pub read_timeout_ms: u64,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli, device: &DeviceProfile) -> Self {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config, device)
    }

    fn merge(cli: &Cli, file_config: FileConfig, device: &DeviceProfile) -> Self {
        Self {
            device: cli.device.clone().or(file_config.device),
            device_name: cli
                .device_name
                .clone()
                .or(file_config.device_name)
                .unwrap_or_else(|| device.evdev_name.into()),
            slots: cli.slots.or(file_config.slots).unwrap_or(device.slots),
            event_size: cli.event_size.or(file_config.event_size),
            host: cli.host.clone().or(file_config.host),
            user: cli
                .user
                .clone()
                .or(file_config.user)
                .unwrap_or_else(|| DEFAULT_SSH_USER.into()),
            key_path: cli.key_path.clone().or(file_config.key_path),
            password: cli.password.clone().or(file_config.password),
            read_timeout_ms: cli
                .read_timeout_ms
                .or(file_config.read_timeout_ms)
                .unwrap_or(DEFAULT_READ_TIMEOUT_MS),
        }
    }

    /// Config for a local device with profile defaults.
    pub fn from_profile(device: &DeviceProfile) -> Self {
        Self::merge(&Cli::default(), FileConfig::default(), device)
    }

    pub fn auth(&self) -> Auth {
        if let Some(ref password) = self.password {
            return Auth::Password(password.clone());
        }
        let path = self.key_path.as_deref().unwrap_or("id_rsa");
        Auth::Key(PathBuf::from(path))
    }

    /// Explicit record layout, `None` to use the native (or remotely detected) one.
    pub fn layout(&self) -> Result<Option<EventLayout>> {
        self.event_size.map(EventLayout::from_record_size).transpose()
    }

    /// `None` disables the bounded wait (reads block until data or EOF).
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.host.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.slots == 0 {
            return Err(Error::Config("slot count must be at least 1".into()));
        }
        if self.slots > i32::MAX as usize {
            return Err(Error::Config(format!("slot count {} is too large", self.slots)));
        }
        self.layout()?;
        if self.device_name.trim().is_empty() && self.device.is_none() {
            return Err(Error::Config("either a device path or a device name is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::FT5406;
    use clap::Parser;

    #[test]
    fn profile_defaults() {
        let config = Config::from_profile(&FT5406);
        assert_eq!(config.slots, 10);
        assert_eq!(config.device_name, "FT5406 memory based driver");
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(100)));
        assert!(!config.is_remote());
        assert!(config.layout().unwrap().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn cli_overrides_file() {
        let cli = Cli::parse_from(["mt-touch", "--slots", "5", "--event-size", "16"]);
        let file = FileConfig {
            slots: Some(8),
            host: Some("10.11.99.1".into()),
            ..FileConfig::default()
        };
        let config = Config::merge(&cli, file, &FT5406);
        assert_eq!(config.slots, 5);
        assert_eq!(config.host.as_deref(), Some("10.11.99.1"));
        assert_eq!(config.layout().unwrap(), Some(EventLayout::Compact));
        assert_eq!(config.user, "root");
    }

    #[test]
    fn password_wins_over_key() {
        let cli = Cli::parse_from(["mt-touch", "--key-path", "k", "--password", "p"]);
        let config = Config::merge(&cli, FileConfig::default(), &FT5406);
        assert!(matches!(config.auth(), Auth::Password(ref p) if p == "p"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::from_profile(&FT5406);
        config.slots = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::from_profile(&FT5406);
        config.event_size = Some(20);
        assert!(config.validate().is_err());

        let mut config = Config::from_profile(&FT5406);
        config.read_timeout_ms = 0;
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn dump_subcommand_parses() {
        let cli = Cli::parse_from(["mt-touch", "dump"]);
        assert_eq!(cli.command, Some(Command::Dump));
    }
}
