/// Database configuration and connection management
pub mod database;

/// Bot configuration loading from config.toml
pub mod settings;

pub use settings::{BotConfig, load_default_config};
