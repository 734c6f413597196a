//! Unified error type for the bot, the menu core and the vendor clients.

use crate::core::menu::TransportError;
use thiserror::Error;

/// Every failure the crate can report, from configuration loading to vendor API calls.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unreadable configuration file / environment.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A reaction menu was set up with invalid controls or content.
    /// Raised before anything is rendered.
    #[error("Invalid menu configuration: {reason}")]
    MenuConfiguration {
        /// Why the menu was rejected
        reason: String,
    },

    /// Database error bubbled up from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A message transport call failed in a way the menu could not recover from.
    #[error("Message transport error: {0}")]
    Transport(#[from] TransportError),

    /// Outbound HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A vendor response did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// An image could not be decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Codewars user '{username}' not found.")]
    CodewarsUserNotFound { username: String },

    #[error("Kata '{id}' not found. Please make sure you have the correct kata ID or slug.")]
    KataNotFound { id: String },

    #[error("No completed katas found.")]
    NoCompletedKatas,

    #[error("Limit must be between 1 and 20, got {limit}.")]
    InvalidLimit { limit: u32 },

    #[error("Could not find an avatar for Codewars user '{username}'.")]
    AvatarNotFound { username: String },

    /// A vendor API answered with an unexpected status.
    #[error("{service} returned an unexpected status: {status}")]
    UnexpectedStatus {
        /// Which vendor
        service: &'static str,
        /// HTTP status code
        status: u16,
    },

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
