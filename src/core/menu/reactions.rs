//! Background attachment of control reactions.

use super::transport::{MenuTransport, MessageHandle, TransportError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Starts adding `symbols` to the message, in order, on a detached task.
///
/// The caller does not need to await the returned handle; the menu starts waiting for
/// input right away so users can react before every affordance is attached.
/// A deleted message stops the task quietly, other failures skip that symbol.
pub fn start_adding_reactions(
    transport: Arc<dyn MenuTransport>,
    message: MessageHandle,
    symbols: Vec<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for symbol in &symbols {
            match transport.add_reaction(message, symbol).await {
                Ok(()) => {}
                Err(TransportError::NotFound) => {
                    debug!(
                        message_id = message.message_id,
                        "menu message gone, stopping reaction attachment"
                    );
                    return;
                }
                Err(e) => {
                    warn!(
                        message_id = message.message_id,
                        symbol = %symbol,
                        "failed to attach menu reaction: {}",
                        e
                    );
                }
            }
        }
    })
}
