//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions other than commands themselves,
//! such as slash command autocomplete.

/// Autocomplete handlers for Codewars usernames and store country codes
pub mod autocomplete;
