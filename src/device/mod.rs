mod ft5406;
mod stream;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use ft5406::FT5406;
pub use stream::DeviceStream;

pub const SYSFS_INPUT_DIR: &str = "/sys/class/input";
pub const DEV_INPUT_DIR: &str = "/dev/input";

/// Device-specific parameters for touch decoding.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    pub name: &'static str,

    /// Name the kernel reports in /sys/class/input/eventN/device/name
    pub evdev_name: &'static str,

    /// Number of multitouch slots the controller reports
    pub slots: usize,
}

impl DeviceProfile {
    /// Profile used when nothing else is configured.
    pub fn current() -> &'static Self {
        &FT5406
    }
}

/// Resolves the device file to read touch records from.
pub trait DeviceLocator {
    fn locate(&self) -> Result<PathBuf>;
}

/// A fixed, already known device path.
impl DeviceLocator for PathBuf {
    fn locate(&self) -> Result<PathBuf> {
        Ok(self.clone())
    }
}

/// Finds a device by the name it reports in sysfs.
#[derive(Debug, Clone)]
pub struct SysfsLocator {
    name: String,
    sysfs_root: PathBuf,
    dev_root: PathBuf,
}

impl SysfsLocator {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_roots(name, SYSFS_INPUT_DIR, DEV_INPUT_DIR)
    }

    pub fn with_roots(
        name: impl Into<String>,
        sysfs_root: impl Into<PathBuf>,
        dev_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            sysfs_root: sysfs_root.into(),
            dev_root: dev_root.into(),
        }
    }

    fn event_dirs(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.sysfs_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("{} does not exist", self.sysfs_root.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_event_node(path))
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

impl DeviceLocator for SysfsLocator {
    fn locate(&self) -> Result<PathBuf> {
        for dir in self.event_dirs()? {
            let name_file = dir.join("device").join("name");
            match fs::read_to_string(&name_file) {
                Ok(name) if name.trim() == self.name => {
                    let path = dev_node(&self.dev_root, &dir)?;
                    log::info!("Found '{}' at {}", self.name, path.display());
                    return Ok(path);
                }
                Ok(name) => log::debug!("Skipping {} ({})", dir.display(), name.trim()),
                // Devices can disappear between listing and reading.
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("Skipping {}: no name file", dir.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::DeviceNotFound {
            name: self.name.clone(),
        })
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with("event"))
        .unwrap_or(false)
}

/// Map a sysfs event directory (or anything below it) to its /dev node.
pub(crate) fn dev_node(dev_root: &Path, sysfs_path: &Path) -> Result<PathBuf> {
    sysfs_path
        .ancestors()
        .find(|p| is_event_node(p))
        .and_then(|p| p.file_name())
        .map(|event| dev_root.join(event))
        .ok_or_else(|| {
            Error::Protocol(format!("{} is not an input event node", sysfs_path.display()))
        })
}
