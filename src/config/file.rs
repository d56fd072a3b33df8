use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<String>,
    pub device_name: Option<String>,
    pub slots: Option<usize>,
    pub event_size: Option<usize>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub key_path: Option<String>,
    pub password: Option<String>,
    pub read_timeout_ms: Option<u64>,
}

pub fn load_from_path(path: &Path) -> Option<FileConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_from_default_paths() -> Option<FileConfig> {
    for path in default_config_paths() {
        if path.exists() {
            if let Some(config) = load_from_path(&path) {
                return Some(config);
            }
        }
    }
    None
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("mt-touch.toml")];

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join("mt-touch.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slots = 5\nhost = \"10.0.0.2\"").unwrap();
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.slots, Some(5));
        assert_eq!(config.host.as_deref(), Some("10.0.0.2"));
        assert!(config.device.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "orientation = \"portrait\"").unwrap();
        assert!(load_from_path(file.path()).is_none());
    }
}
