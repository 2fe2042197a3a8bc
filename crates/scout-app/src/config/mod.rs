//! Configuration file parsing for Pothole Scout
//!
//! A single `config.toml`, looked up at an explicit path or under the user's
//! config directory.

pub mod settings;
pub mod types;

pub use settings::{
    default_config_path, init_config_file, load_settings, validate_settings, CONFIG_FILENAME,
};
pub use types::*;
