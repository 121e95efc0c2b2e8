mod cli;
mod file;
mod gesture;

pub use cli::{Cli, Command};
pub use gesture::GestureConfig;

use crate::input::{INPUT_EVENT_SIZE_32, INPUT_EVENT_SIZE_64};
use crate::orientation::Orientation;

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub device: String,
    pub event_size: usize,
    pub dry_run: bool,
    pub orientation: Orientation,
    pub gesture: GestureConfig,
}

impl Default for Config {
    fn default() -> Self {
        let file = file::FileConfig::default();
        Self {
            device: file.device,
            event_size: native_event_size(),
            dry_run: file.dry_run,
            orientation: file.orientation,
            gesture: file.gesture,
        }
    }
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Self {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: file::FileConfig) -> Self {
        let mut gesture = file_config.gesture;
        gesture.natural_scrolling |= cli.natural_scrolling;

        Self {
            device: cli.device.clone().unwrap_or(file_config.device),
            event_size: cli
                .event_size
                .or(file_config.event_size)
                .unwrap_or(native_event_size()),
            dry_run: cli.dry_run || file_config.dry_run,
            orientation: cli.orientation.unwrap_or(file_config.orientation),
            gesture,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.event_size != INPUT_EVENT_SIZE_32 && self.event_size != INPUT_EVENT_SIZE_64 {
            return Err(format!(
                "event size must be {} or {} (got {})",
                INPUT_EVENT_SIZE_32, INPUT_EVENT_SIZE_64, self.event_size
            ));
        }
        self.gesture.validate()
    }
}

/// `struct input_event` size for the running kernel's word size.
fn native_event_size() -> usize {
    if cfg!(target_pointer_width = "64") {
        INPUT_EVENT_SIZE_64
    } else {
        INPUT_EVENT_SIZE_32
    }
}
