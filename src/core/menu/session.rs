//! Session state threaded through each menu cycle.

use super::{controls::ControlTable, pages::DEFAULT_PAGE_SIZE, transport::MessageHandle};
use crate::{
    core::embed::PageItem,
    errors::{Error, Result},
};
use std::{sync::Arc, time::Duration};

/// Seconds to wait for a reaction before the menu is cleaned up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything one menu interaction needs, passed by value from transition to transition.
///
/// Content and controls are shared and never change mid-session; each transition
/// returns a new `Session` with an updated page index and message handle.
#[derive(Clone)]
pub struct Session {
    participant: u64,
    items: Arc<[PageItem]>,
    controls: ControlTable,
    page_size: usize,
    page: usize,
    timeout: Duration,
    message: Option<MessageHandle>,
}

impl Session {
    /// Starts a session for `participant` with default page size and timeout.
    pub fn new(
        participant: u64,
        items: impl Into<Arc<[PageItem]>>,
        controls: ControlTable,
    ) -> Self {
        Self {
            participant,
            items: items.into(),
            controls,
            page_size: DEFAULT_PAGE_SIZE,
            page: 0,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            message: None,
        }
    }

    /// Sets how many items share one page; 0 is rejected.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::MenuConfiguration {
                reason: "page size must be at least 1".to_string(),
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Attaches an already rendered message; the next cycle edits it instead of sending.
    #[must_use]
    pub const fn with_message(mut self, message: MessageHandle) -> Self {
        self.message = Some(message);
        self
    }

    #[must_use]
    pub const fn participant(&self) -> u64 {
        self.participant
    }

    #[must_use]
    pub fn items(&self) -> &[PageItem] {
        &self.items
    }

    /// The content, shared rather than copied.
    #[must_use]
    pub fn shared_items(&self) -> Arc<[PageItem]> {
        Arc::clone(&self.items)
    }

    #[must_use]
    pub const fn controls(&self) -> &ControlTable {
        &self.controls
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn message(&self) -> Option<MessageHandle> {
        self.message
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("participant", &self.participant)
            .field("items", &self.items.len())
            .field("controls", &self.controls.symbols().collect::<Vec<_>>())
            .field("page_size", &self.page_size)
            .field("page", &self.page)
            .field("timeout", &self.timeout)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::menu::controls::{CLOSE_SYMBOL, NEXT_SYMBOL, PREV_SYMBOL};

    fn session() -> Session {
        let items: Vec<PageItem> = ["one", "two", "three"].into_iter().map(PageItem::from).collect();
        Session::new(42, items, ControlTable::standard())
    }

    #[test]
    fn test_new_session_defaults() {
        let session = session();
        assert_eq!(session.participant(), 42);
        assert_eq!(session.items().len(), 3);
        assert_eq!(session.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(session.page(), 0);
        assert_eq!(session.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(session.message().is_none());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = session().with_page_size(0);
        assert!(matches!(result, Err(Error::MenuConfiguration { .. })));
    }

    #[test]
    fn test_transitions_share_content_and_controls() -> Result<()> {
        let start = session().with_page_size(2)?;
        let handle = MessageHandle {
            channel_id: 7,
            message_id: 9,
        };
        let next = start
            .clone()
            .with_page(1)
            .with_message(handle)
            .with_timeout(Duration::from_secs(5));

        assert!(Arc::ptr_eq(&start.shared_items(), &next.shared_items()));
        let symbols: Vec<&str> = next.controls().symbols().collect();
        assert_eq!(symbols, vec![PREV_SYMBOL, CLOSE_SYMBOL, NEXT_SYMBOL]);

        assert_eq!(next.page(), 1);
        assert_eq!(next.page_size(), 2);
        assert_eq!(next.message(), Some(handle));
        assert_eq!(next.timeout(), Duration::from_secs(5));
        assert_eq!(next.participant(), start.participant());

        // The original is untouched
        assert_eq!(start.page(), 0);
        assert!(start.message().is_none());
        Ok(())
    }
}
