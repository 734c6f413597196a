//! Core layer - framework-agnostic menu engine, vendor clients and settings logic.
//!
//! Nothing in here knows about serenity or poise; the bot layer adapts these
//! modules to Discord.

/// Codewars API client and embed builders
pub mod codewars;
/// Dominant colour extraction for artwork
pub mod color;
/// Epic Games Store promotions feed
pub mod egs;
/// Framework-agnostic rich content
pub mod embed;
/// Reaction-driven paginated menus
pub mod menu;
/// Per-user settings persistence
pub mod settings;
