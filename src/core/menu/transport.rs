//! The message/reaction operations the menu needs from the chat platform.
//!
//! The menu core only talks to [`MenuTransport`]; `bot::transport` binds it to serenity.

use crate::core::embed::PageItem;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed transport call, split into the cases the menu treats differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The message (or reaction) is gone. Usually deleted by someone else.
    #[error("message or reaction not found")]
    NotFound,
    /// The bot lacks the privilege for this operation.
    #[error("missing permission")]
    PermissionDenied,
    /// Anything else the platform reported.
    #[error("{0}")]
    Other(String),
}

/// Result alias for transport calls.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Identifies a rendered menu message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Whose reaction to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOwner {
    /// The bot's own affordance
    Bot,
    /// A user's reaction
    User(u64),
}

/// A reaction-add event as seen by the wait step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionInput {
    pub message_id: u64,
    pub user_id: u64,
    pub symbol: String,
}

/// The page being shown, with enough context for the transport to render it.
#[derive(Debug, Clone, Copy)]
pub struct RenderedPage<'a> {
    pub index: usize,
    pub page_count: usize,
    pub items: &'a [PageItem],
}

/// Decides whether a reaction may drive the session.
///
/// Qualifying input targets the menu message, comes from the participant, and uses one of
/// the control symbols. Everything else is ignored by the wait step.
#[derive(Debug, Clone)]
pub struct InputFilter {
    pub message_id: u64,
    pub participant: u64,
    pub symbols: Vec<String>,
}

impl InputFilter {
    #[must_use]
    pub fn matches(&self, input: &ReactionInput) -> bool {
        input.message_id == self.message_id
            && input.user_id == self.participant
            && self.symbols.iter().any(|symbol| *symbol == input.symbol)
    }
}

/// Message and reaction operations used by the menu controller.
#[async_trait]
pub trait MenuTransport: Send + Sync {
    /// Posts a new message showing `page`.
    async fn send(&self, page: RenderedPage<'_>) -> TransportResult<MessageHandle>;

    /// Replaces the content of an existing message with `page`.
    async fn edit(&self, handle: MessageHandle, page: RenderedPage<'_>) -> TransportResult<()>;

    async fn delete(&self, handle: MessageHandle) -> TransportResult<()>;

    /// Adds `symbol` as one of the bot's reactions.
    async fn add_reaction(&self, handle: MessageHandle, symbol: &str) -> TransportResult<()>;

    async fn remove_reaction(
        &self,
        handle: MessageHandle,
        symbol: &str,
        owner: ReactionOwner,
    ) -> TransportResult<()>;

    /// Removes every reaction on the message in one call.
    async fn clear_reactions(&self, handle: MessageHandle) -> TransportResult<()>;

    /// Waits until a reaction passing `filter` arrives, or `timeout` elapses (`Ok(None)`).
    ///
    /// Non-qualifying reactions are skipped without extending the deadline.
    async fn await_input(
        &self,
        filter: &InputFilter,
        timeout: Duration,
    ) -> TransportResult<Option<ReactionInput>>;

    /// Whether the bot may manage other users' reactions where `handle` lives.
    async fn can_manage_messages(&self, handle: MessageHandle) -> bool;
}
