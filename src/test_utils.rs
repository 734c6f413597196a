//! Shared test utilities for `kata-buddy`.
//!
//! This module provides an in-memory database setup and a scripted message transport
//! that records every call the menu makes and feeds it reactions from a channel.

#![allow(clippy::unwrap_used)]

use crate::core::menu::{
    InputFilter, MenuTransport, MessageHandle, ReactionInput, ReactionOwner, RenderedPage,
    TransportError, TransportResult,
};
use crate::errors::Result;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

/// Channel every fake menu message lives in.
pub const FAKE_CHANNEL_ID: u64 = 1;
/// Id of the message the fake transport "sends".
pub const FAKE_MESSAGE_ID: u64 = 100;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A transport call as recorded by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send { page: usize, items: usize },
    Edit { page: usize, items: usize },
    Delete,
    AddReaction(String),
    RemoveReaction(String, ReactionOwner),
    ClearReactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    Send,
    Edit,
    Delete,
    AddReaction,
    RemoveReaction,
    ClearReactions,
}

/// In-memory [`MenuTransport`] with scripted failures and reactions.
pub struct FakeTransport {
    calls: Mutex<Vec<TransportCall>>,
    failures: Mutex<HashMap<Op, VecDeque<TransportError>>>,
    manage_messages: bool,
    deleted: AtomicBool,
    input_tx: mpsc::UnboundedSender<ReactionInput>,
    input_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ReactionInput>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            manage_messages: false,
            deleted: AtomicBool::new(false),
            input_tx,
            input_rx: tokio::sync::Mutex::new(input_rx),
        }
    }

    /// Grants or withholds the manage-messages permission.
    pub fn with_manage_messages(mut self, allowed: bool) -> Self {
        self.manage_messages = allowed;
        self
    }

    pub const fn existing_message(&self) -> MessageHandle {
        MessageHandle {
            channel_id: FAKE_CHANNEL_ID,
            message_id: FAKE_MESSAGE_ID,
        }
    }

    /// Queues a reaction on the menu message.
    pub fn push_input(&self, user_id: u64, symbol: &str) {
        self.push_input_on(FAKE_MESSAGE_ID, user_id, symbol);
    }

    /// Queues a reaction on an arbitrary message.
    pub fn push_input_on(&self, message_id: u64, user_id: u64, symbol: &str) {
        self.input_tx
            .send(ReactionInput {
                message_id,
                user_id,
                symbol: symbol.to_string(),
            })
            .unwrap();
    }

    /// From now on every call against the message reports `NotFound`.
    pub fn delete_message_externally(&self) {
        self.deleted.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_edit(&self, error: TransportError) {
        self.queue_failure(Op::Edit, error);
    }

    pub fn fail_next_add_reaction(&self, error: TransportError) {
        self.queue_failure(Op::AddReaction, error);
    }

    pub fn fail_next_remove_reaction(&self, error: TransportError) {
        self.queue_failure(Op::RemoveReaction, error);
    }

    pub fn fail_next_clear(&self, error: TransportError) {
        self.queue_failure(Op::ClearReactions, error);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Page indices in the order they were sent or edited in.
    pub fn pages_shown(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send { page, .. } | TransportCall::Edit { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }

    pub fn added_reactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::AddReaction(symbol) => Some(symbol),
                _ => None,
            })
            .collect()
    }

    pub fn removed_reactions(&self) -> Vec<(String, ReactionOwner)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::RemoveReaction(symbol, owner) => Some((symbol, owner)),
                _ => None,
            })
            .collect()
    }

    fn queue_failure(&self, op: Op, error: TransportError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    fn record(&self, op: Op, call: TransportCall) -> TransportResult<()> {
        self.calls.lock().unwrap().push(call);
        if let Some(error) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if op != Op::Send && self.deleted.load(Ordering::SeqCst) {
            return Err(TransportError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl MenuTransport for FakeTransport {
    async fn send(&self, page: RenderedPage<'_>) -> TransportResult<MessageHandle> {
        self.record(
            Op::Send,
            TransportCall::Send {
                page: page.index,
                items: page.items.len(),
            },
        )?;
        Ok(self.existing_message())
    }

    async fn edit(&self, _handle: MessageHandle, page: RenderedPage<'_>) -> TransportResult<()> {
        self.record(
            Op::Edit,
            TransportCall::Edit {
                page: page.index,
                items: page.items.len(),
            },
        )
    }

    async fn delete(&self, _handle: MessageHandle) -> TransportResult<()> {
        self.record(Op::Delete, TransportCall::Delete)
    }

    async fn add_reaction(&self, _handle: MessageHandle, symbol: &str) -> TransportResult<()> {
        self.record(
            Op::AddReaction,
            TransportCall::AddReaction(symbol.to_string()),
        )
    }

    async fn remove_reaction(
        &self,
        _handle: MessageHandle,
        symbol: &str,
        owner: ReactionOwner,
    ) -> TransportResult<()> {
        self.record(
            Op::RemoveReaction,
            TransportCall::RemoveReaction(symbol.to_string(), owner),
        )
    }

    async fn clear_reactions(&self, _handle: MessageHandle) -> TransportResult<()> {
        self.record(Op::ClearReactions, TransportCall::ClearReactions)
    }

    async fn await_input(
        &self,
        filter: &InputFilter,
        timeout: Duration,
    ) -> TransportResult<Option<ReactionInput>> {
        let deadline = Instant::now() + timeout;
        let mut inputs = self.input_rx.lock().await;
        loop {
            match tokio::time::timeout_at(deadline, inputs.recv()).await {
                Ok(Some(input)) if filter.matches(&input) => return Ok(Some(input)),
                Ok(Some(_)) => {}
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    return Ok(None);
                }
                Err(_) => return Ok(None),
            }
        }
    }

    async fn can_manage_messages(&self, _handle: MessageHandle) -> bool {
        self.manage_messages
    }
}
