//! Standard next / previous / close handlers.

use super::{
    controls::{ControlHandler, Dispatch, Transition},
    pages::{next_index, prev_index},
    session::Session,
    transport::{ReactionOwner, TransportError},
};
use crate::errors::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Advances one page, wrapping from the last page to the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextPage;

/// Goes back one page, wrapping from the first page to the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevPage;

/// Deletes the menu message and ends the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseMenu;

#[async_trait]
impl ControlHandler for NextPage {
    async fn handle(&self, dispatch: Dispatch<'_>, session: Session) -> Result<Transition> {
        tidy_participant_reaction(&dispatch, session.participant()).await;
        let page = next_index(session.page(), dispatch.page_count);
        Ok(Transition::Continue(
            session.with_page(page).with_message(dispatch.message),
        ))
    }
}

#[async_trait]
impl ControlHandler for PrevPage {
    async fn handle(&self, dispatch: Dispatch<'_>, session: Session) -> Result<Transition> {
        tidy_participant_reaction(&dispatch, session.participant()).await;
        let page = prev_index(session.page(), dispatch.page_count);
        Ok(Transition::Continue(
            session.with_page(page).with_message(dispatch.message),
        ))
    }
}

#[async_trait]
impl ControlHandler for CloseMenu {
    async fn handle(&self, dispatch: Dispatch<'_>, _session: Session) -> Result<Transition> {
        match dispatch.transport.delete(dispatch.message).await {
            Ok(()) | Err(TransportError::NotFound) => {}
            Err(e) => warn!(
                message_id = dispatch.message.message_id,
                "failed to delete menu message: {}",
                e
            ),
        }
        Ok(Transition::Close)
    }
}

/// Removes the participant's reaction so the same button can be pressed again.
/// Skipped without manage permission; failures are never fatal.
async fn tidy_participant_reaction(dispatch: &Dispatch<'_>, participant: u64) {
    if !dispatch.transport.can_manage_messages(dispatch.message).await {
        return;
    }

    match dispatch
        .transport
        .remove_reaction(
            dispatch.message,
            dispatch.symbol,
            ReactionOwner::User(participant),
        )
        .await
    {
        Ok(()) => {}
        Err(TransportError::NotFound) => debug!("participant reaction already gone"),
        Err(e) => debug!("could not remove participant reaction: {}", e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;
    use crate::core::embed::PageItem;
    use crate::core::menu::controls::{ControlTable, NEXT_SYMBOL, PREV_SYMBOL};
    use crate::test_utils::{FakeTransport, TransportCall};

    const PARTICIPANT: u64 = 42;

    fn session_at(page: usize) -> Session {
        let items: Vec<PageItem> = (0..15).map(|i| PageItem::Text(format!("item {i}"))).collect();
        Session::new(PARTICIPANT, items, ControlTable::standard()).with_page(page)
    }

    fn dispatch<'a>(transport: &'a FakeTransport, symbol: &'a str) -> Dispatch<'a> {
        Dispatch {
            transport,
            message: transport.existing_message(),
            symbol,
            page_count: 3,
        }
    }

    fn expect_page(transition: Transition) -> usize {
        match transition {
            Transition::Continue(session) => session.page(),
            Transition::Close => panic!("expected the session to continue"),
        }
    }

    #[tokio::test]
    async fn test_next_wraps_from_last_page() -> Result<()> {
        let transport = FakeTransport::new();
        let transition = NextPage
            .handle(dispatch(&transport, NEXT_SYMBOL), session_at(2))
            .await?;
        assert_eq!(expect_page(transition), 0);

        let transition = NextPage
            .handle(dispatch(&transport, NEXT_SYMBOL), session_at(0))
            .await?;
        assert_eq!(expect_page(transition), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_prev_wraps_from_first_page() -> Result<()> {
        let transport = FakeTransport::new();
        let transition = PrevPage
            .handle(dispatch(&transport, PREV_SYMBOL), session_at(0))
            .await?;
        assert_eq!(expect_page(transition), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_continue_keeps_message_handle() -> Result<()> {
        let transport = FakeTransport::new();
        let transition = NextPage
            .handle(dispatch(&transport, NEXT_SYMBOL), session_at(0))
            .await?;
        let Transition::Continue(session) = transition else {
            panic!("expected the session to continue");
        };
        assert_eq!(session.message(), Some(transport.existing_message()));
        Ok(())
    }

    #[tokio::test]
    async fn test_participant_reaction_removed_with_manage_permission() -> Result<()> {
        let transport = FakeTransport::new().with_manage_messages(true);
        transport.fail_next_remove_reaction(TransportError::NotFound);

        let transition = NextPage
            .handle(dispatch(&transport, NEXT_SYMBOL), session_at(1))
            .await?;

        assert_eq!(expect_page(transition), 2, "not-found is tolerated");
        assert_eq!(
            transport.calls(),
            vec![TransportCall::RemoveReaction(
                NEXT_SYMBOL.to_string(),
                ReactionOwner::User(PARTICIPANT)
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_participant_reaction_left_alone_without_permission() -> Result<()> {
        let transport = FakeTransport::new();
        PrevPage
            .handle(dispatch(&transport, PREV_SYMBOL), session_at(1))
            .await?;
        assert!(transport.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_close_deletes_and_ends_session() -> Result<()> {
        let transport = FakeTransport::new();
        let transition = CloseMenu
            .handle(dispatch(&transport, "❌"), session_at(1))
            .await?;
        assert!(matches!(transition, Transition::Close));
        assert_eq!(transport.calls(), vec![TransportCall::Delete]);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_tolerates_already_deleted_message() -> Result<()> {
        let transport = FakeTransport::new();
        transport.delete_message_externally();
        let transition = CloseMenu
            .handle(dispatch(&transport, "❌"), session_at(0))
            .await?;
        assert!(matches!(transition, Transition::Close));
        Ok(())
    }
}
