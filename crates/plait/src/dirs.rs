//! Locations of user-level configuration.

use std::path::PathBuf;

use etcetera::{BaseStrategy, choose_base_strategy};

/// Name of the configuration file, both per user and per project.
pub const CONFIG_FILE_NAME: &str = "plait.toml";

/// `~/.config/plait` on Linux and macOS, `%APPDATA%\plait` on Windows.
pub fn user_config_dir() -> Option<PathBuf> {
    choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join("plait"))
}

/// The user configuration file, if a home directory can be determined.
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
