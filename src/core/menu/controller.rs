//! The menu session loop: render, wait for a reaction, dispatch, repeat.

use super::{
    controls::{Dispatch, Transition},
    pages::PageSet,
    reactions::start_adding_reactions,
    session::Session,
    transport::{
        InputFilter, MenuTransport, MessageHandle, ReactionOwner, RenderedPage, TransportError,
    },
};
use crate::{
    core::menu::ControlTable,
    errors::{Error, Result},
};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// How a menu session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// A handler ended the session (the close control).
    Closed,
    /// Nobody qualified reacted in time; reactions were cleaned up.
    TimedOut,
    /// The menu message was deleted by someone else.
    MessageGone,
}

/// Runs a reaction menu until it is closed, times out, or its message disappears.
///
/// Each cycle renders the current page (sending on the first cycle, editing afterwards),
/// waits for a qualifying reaction, and hands the session to the matching handler.
/// Handlers run strictly one after another.
#[instrument(skip(transport, session), fields(participant = session.participant()))]
pub async fn run_menu(transport: Arc<dyn MenuTransport>, session: Session) -> Result<MenuOutcome> {
    if session.items().is_empty() {
        return Err(Error::MenuConfiguration {
            reason: "menu has no content to show".to_string(),
        });
    }

    let items = session.shared_items();
    let pages = PageSet::new(&items, session.page_size())?;
    let controls = session.controls().clone();
    let mut session = session;

    loop {
        // RENDER
        let (page, page_count) = {
            let (index, content) = pages.clamped(session.page());
            (
                RenderedPage {
                    index,
                    page_count: pages.len(),
                    items: content,
                },
                pages.len(),
            )
        };
        let Some(message) = render(&transport, &session, &controls, page).await? else {
            debug!("menu message deleted, ending session");
            return Ok(MenuOutcome::MessageGone);
        };
        session = session.with_page(page.index).with_message(message);

        // AWAIT_INPUT
        let filter = InputFilter {
            message_id: message.message_id,
            participant: session.participant(),
            symbols: controls.symbols().map(str::to_string).collect(),
        };
        let Some(input) = transport.await_input(&filter, session.timeout()).await? else {
            // TIMEOUT_CLEANUP
            clear_menu_reactions(transport.as_ref(), message, &controls).await;
            debug!("menu timed out");
            return Ok(MenuOutcome::TimedOut);
        };

        // DISPATCH
        let Some(entry) = controls.get(&input.symbol) else {
            warn!(symbol = %input.symbol, "transport returned input for an unknown control");
            continue;
        };
        trace!(symbol = %input.symbol, page = session.page(), "dispatching menu control");
        let dispatch = Dispatch {
            transport: transport.as_ref(),
            message,
            symbol: &input.symbol,
            page_count,
        };
        match entry.handler().handle(dispatch, session).await? {
            Transition::Continue(next) => session = next,
            Transition::Close => return Ok(MenuOutcome::Closed),
        }
    }
}

/// Shows `page`, returning `None` when the message to edit no longer exists.
async fn render(
    transport: &Arc<dyn MenuTransport>,
    session: &Session,
    controls: &ControlTable,
    page: RenderedPage<'_>,
) -> Result<Option<MessageHandle>> {
    let Some(message) = session.message() else {
        let message = transport.send(page).await?;
        start_adding_reactions(
            Arc::clone(transport),
            message,
            controls.symbols().map(str::to_string).collect(),
        );
        return Ok(Some(message));
    };

    match transport.edit(message, page).await {
        Ok(()) => Ok(Some(message)),
        Err(TransportError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Removes the menu's reactions after a timeout.
///
/// Tries a single bulk clear when the bot may manage messages, otherwise removes its own
/// reaction for each control. A permission failure stops the per-symbol loop since the
/// remaining removals would fail the same way. Never fails.
pub async fn clear_menu_reactions(
    transport: &dyn MenuTransport,
    message: MessageHandle,
    controls: &ControlTable,
) {
    if transport.can_manage_messages(message).await {
        match transport.clear_reactions(message).await {
            Ok(()) | Err(TransportError::NotFound) => return,
            Err(e) => debug!("bulk reaction clear failed, removing one by one: {}", e),
        }
    }

    for symbol in controls.symbols() {
        match transport
            .remove_reaction(message, symbol, ReactionOwner::Bot)
            .await
        {
            Ok(()) | Err(TransportError::NotFound) => {}
            Err(TransportError::PermissionDenied) => {
                debug!("no permission to remove menu reactions, leaving them");
                return;
            }
            Err(e) => debug!(symbol, "failed to remove menu reaction: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::embed::PageItem;
    use crate::core::menu::{
        ControlHandler, PREV_SYMBOL,
        controls::{CLOSE_SYMBOL, NEXT_SYMBOL},
    };
    use crate::test_utils::{FakeTransport, TransportCall, init_test_tracing};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    const PARTICIPANT: u64 = 42;
    const STRANGER: u64 = 7;

    fn items(count: usize) -> Vec<PageItem> {
        (0..count)
            .map(|i| PageItem::Text(format!("item {i}")))
            .collect()
    }

    fn session(count: usize) -> Session {
        Session::new(PARTICIPANT, items(count), ControlTable::standard())
    }

    fn start(transport: &Arc<FakeTransport>, session: Session) -> tokio::task::JoinHandle<Result<MenuOutcome>> {
        let transport: Arc<dyn MenuTransport> = transport.clone();
        tokio::spawn(run_menu(transport, session))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_render_sends_page_and_attaches_controls() -> Result<()> {
        init_test_tracing();
        let transport = Arc::new(FakeTransport::new().with_manage_messages(true));

        let outcome = start(&transport, session(12)).await.unwrap()?;

        assert_eq!(outcome, MenuOutcome::TimedOut);
        let calls = transport.calls();
        assert_eq!(calls[0], TransportCall::Send { page: 0, items: 5 });
        assert_eq!(
            transport.added_reactions(),
            vec![PREV_SYMBOL, CLOSE_SYMBOL, NEXT_SYMBOL]
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_wraps_and_close_ends_session() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());
        transport.push_input(PARTICIPANT, NEXT_SYMBOL);
        transport.push_input(PARTICIPANT, NEXT_SYMBOL);
        transport.push_input(PARTICIPANT, NEXT_SYMBOL);
        transport.push_input(PARTICIPANT, CLOSE_SYMBOL);

        let outcome = start(&transport, session(12)).await.unwrap()?;

        assert_eq!(outcome, MenuOutcome::Closed);
        assert_eq!(transport.pages_shown(), vec![0, 1, 2, 0]);
        let calls = transport.calls();
        assert!(calls.contains(&TransportCall::Edit { page: 2, items: 2 }));
        // Nothing is rendered after the close
        let delete_at = calls.iter().position(|c| *c == TransportCall::Delete).unwrap();
        assert!(
            calls[delete_at..]
                .iter()
                .all(|c| !matches!(c, TransportCall::Edit { .. } | TransportCall::Send { .. }))
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_prev_from_first_page_wraps_to_last() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());
        transport.push_input(PARTICIPANT, PREV_SYMBOL);
        transport.push_input(PARTICIPANT, CLOSE_SYMBOL);

        start(&transport, session(12)).await.unwrap()?;

        assert_eq!(transport.pages_shown(), vec![0, 2]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_qualifying_input_is_ignored_without_extending_timeout() -> Result<()> {
        let transport = Arc::new(FakeTransport::new().with_manage_messages(true));
        transport.push_input(STRANGER, NEXT_SYMBOL);
        transport.push_input(PARTICIPANT, "🔥");
        transport.push_input_on(999, PARTICIPANT, NEXT_SYMBOL);

        let started = Instant::now();
        let outcome = start(
            &transport,
            session(12).with_timeout(Duration::from_secs(30)),
        )
        .await
        .unwrap()?;

        assert_eq!(outcome, MenuOutcome::TimedOut);
        assert_eq!(transport.pages_shown(), vec![0], "no handler ran");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_manage_permission_clears_once() -> Result<()> {
        let transport = Arc::new(FakeTransport::new().with_manage_messages(true));

        start(&transport, session(3)).await.unwrap()?;

        let cleanup: Vec<TransportCall> = transport
            .calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    TransportCall::ClearReactions | TransportCall::RemoveReaction(..)
                )
            })
            .collect();
        assert_eq!(cleanup, vec![TransportCall::ClearReactions]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_permission_removes_each_control() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());

        start(&transport, session(3)).await.unwrap()?;

        assert_eq!(
            transport.removed_reactions(),
            vec![
                (PREV_SYMBOL.to_string(), ReactionOwner::Bot),
                (CLOSE_SYMBOL.to_string(), ReactionOwner::Bot),
                (NEXT_SYMBOL.to_string(), ReactionOwner::Bot),
            ]
        );
        assert!(!transport.calls().contains(&TransportCall::ClearReactions));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_bulk_clear_falls_back_to_per_symbol_removal() -> Result<()> {
        let transport = Arc::new(FakeTransport::new().with_manage_messages(true));
        transport.fail_next_clear(TransportError::PermissionDenied);

        start(&transport, session(3)).await.unwrap()?;

        assert_eq!(transport.removed_reactions().len(), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_stops_per_symbol_cleanup() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());
        transport.fail_next_remove_reaction(TransportError::PermissionDenied);

        let outcome = start(&transport, session(3)).await.unwrap()?;

        assert_eq!(outcome, MenuOutcome::TimedOut);
        assert_eq!(transport.removed_reactions().len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_after_message_deleted_completes() -> Result<()> {
        for manage in [true, false] {
            let transport = Arc::new(FakeTransport::new().with_manage_messages(manage));
            let message = transport.existing_message();
            transport.delete_message_externally();

            clear_menu_reactions(transport.as_ref(), message, &ControlTable::standard()).await;
        }
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_of_deleted_message_ends_session_silently() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());
        transport.push_input(PARTICIPANT, NEXT_SYMBOL);
        transport.fail_next_edit(TransportError::NotFound);

        let outcome = start(&transport, session(12)).await.unwrap()?;

        assert_eq!(outcome, MenuOutcome::MessageGone);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_start_page_clamps_to_last() -> Result<()> {
        let transport = Arc::new(FakeTransport::new());
        transport.push_input(PARTICIPANT, NEXT_SYMBOL);
        transport.push_input(PARTICIPANT, CLOSE_SYMBOL);

        start(&transport, session(12).with_page(9)).await.unwrap()?;

        assert_eq!(transport.pages_shown(), vec![2, 0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected_before_rendering() {
        let transport = Arc::new(FakeTransport::new());

        let result = start(&transport, session(0)).await.unwrap();

        assert!(matches!(result, Err(Error::MenuConfiguration { .. })));
        assert!(transport.calls().is_empty());
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl ControlHandler for Counting {
        async fn handle(&self, dispatch: Dispatch<'_>, session: Session) -> Result<Transition> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Transition::Continue(session.with_message(dispatch.message)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_handler_call_per_qualifying_input() -> Result<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let controls = ControlTable::builder()
            .control("🔁", Counting(Arc::clone(&counter)))
            .build()?;
        let transport = Arc::new(FakeTransport::new());
        transport.push_input(PARTICIPANT, "🔁");
        transport.push_input(STRANGER, "🔁");
        transport.push_input(PARTICIPANT, "🔁");

        let outcome = start(
            &transport,
            Session::new(PARTICIPANT, items(4), controls),
        )
        .await
        .unwrap()?;

        assert_eq!(outcome, MenuOutcome::TimedOut);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(transport.pages_shown(), vec![0, 0, 0]);
        Ok(())
    }
}
