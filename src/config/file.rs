use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::GestureConfig;
use crate::orientation::Orientation;

const DEFAULT_DEVICE: &str = "/dev/input/event0";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default = "default_device")]
    pub device: String,
    pub event_size: Option<usize>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub gesture: GestureConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.into(),
            event_size: None,
            dry_run: false,
            orientation: Orientation::default(),
            gesture: GestureConfig::default(),
        }
    }
}

fn default_device() -> String {
    DEFAULT_DEVICE.into()
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
    let mut paths = Vec::new();

    paths.push(PathBuf::from("mtpad.toml"));

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join("mtpad.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            device = "/dev/input/event7"
            event_size = 16
            orientation = "rotate-left"

            [gesture]
            tap_max_ms = 100
            natural_scrolling = true
            "#,
        )
        .unwrap();

        assert_eq!(config.device, "/dev/input/event7");
        assert_eq!(config.event_size, Some(16));
        assert_eq!(config.orientation, Orientation::RotateLeft);
        assert_eq!(config.gesture.tap_max_ms, 100);
        assert!(config.gesture.natural_scrolling);
        assert_eq!(config.gesture.drag_release_ms, 500);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.device, DEFAULT_DEVICE);
        assert_eq!(config.gesture, GestureConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<FileConfig>("host = \"x\"\n").is_err());
    }
}
