//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Codewars profile, kata and settings commands
pub mod codewars;

/// Epic Games Store free games commands
pub mod egs;

/// General utility commands
pub mod general;

// Export commands
pub use codewars::*;
pub use egs::*;
pub use general::*;
