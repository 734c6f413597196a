//! Control tables: which reaction drives which handler.

use super::{
    handlers::{CloseMenu, NextPage, PrevPage},
    session::Session,
    transport::{MenuTransport, MessageHandle},
};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// "⬅️"
pub const PREV_SYMBOL: &str = "\u{2B05}\u{FE0F}";
/// "❌"
pub const CLOSE_SYMBOL: &str = "\u{274C}";
/// "➡️"
pub const NEXT_SYMBOL: &str = "\u{27A1}\u{FE0F}";

/// What a handler sees when its symbol was selected.
pub struct Dispatch<'a> {
    pub transport: &'a dyn MenuTransport,
    /// The rendered menu message
    pub message: MessageHandle,
    /// The symbol the participant reacted with
    pub symbol: &'a str,
    pub page_count: usize,
}

/// What the session does after a handler ran.
#[derive(Debug)]
pub enum Transition {
    /// Render again with the returned state.
    Continue(Session),
    /// End the session.
    Close,
}

/// Reaction handler. Implementors decide the next session state.
#[async_trait]
pub trait ControlHandler: Send + Sync {
    async fn handle(&self, dispatch: Dispatch<'_>, session: Session) -> Result<Transition>;
}

/// A symbol and the handler it dispatches to.
#[derive(Clone)]
pub struct ControlEntry {
    symbol: String,
    handler: Arc<dyn ControlHandler>,
}

impl ControlEntry {
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn handler(&self) -> &dyn ControlHandler {
        self.handler.as_ref()
    }
}

/// Ordered symbol → handler mapping with unique symbols.
///
/// Order is the order reactions get attached to the message; dispatch is by exact symbol.
/// Cloning shares the entries.
#[derive(Clone)]
pub struct ControlTable {
    entries: Arc<[ControlEntry]>,
}

impl ControlTable {
    #[must_use]
    pub fn builder() -> ControlTableBuilder {
        ControlTableBuilder::default()
    }

    /// ⬅️ previous, ❌ close, ➡️ next.
    #[must_use]
    pub fn standard() -> Self {
        let entries: Vec<ControlEntry> = vec![
            ControlEntry {
                symbol: PREV_SYMBOL.to_string(),
                handler: Arc::new(PrevPage),
            },
            ControlEntry {
                symbol: CLOSE_SYMBOL.to_string(),
                handler: Arc::new(CloseMenu),
            },
            ControlEntry {
                symbol: NEXT_SYMBOL.to_string(),
                handler: Arc::new(NextPage),
            },
        ];
        Self {
            entries: entries.into(),
        }
    }

    /// Looks up the entry for an incoming symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&ControlEntry> {
        self.entries.iter().find(|entry| entry.symbol == symbol)
    }

    /// Symbols in attachment order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.symbol.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects controls; [`ControlTableBuilder::build`] validates them all at once.
#[derive(Default)]
pub struct ControlTableBuilder {
    entries: Vec<ControlEntry>,
}

impl ControlTableBuilder {
    #[must_use]
    pub fn control(mut self, symbol: impl Into<String>, handler: impl ControlHandler + 'static) -> Self {
        self.entries.push(ControlEntry {
            symbol: symbol.into(),
            handler: Arc::new(handler),
        });
        self
    }

    #[must_use]
    pub fn shared_control(
        mut self,
        symbol: impl Into<String>,
        handler: Arc<dyn ControlHandler>,
    ) -> Self {
        self.entries.push(ControlEntry {
            symbol: symbol.into(),
            handler,
        });
        self
    }

    /// Fails with [`Error::MenuConfiguration`] on an empty table, a blank symbol
    /// or a repeated symbol.
    pub fn build(self) -> Result<ControlTable> {
        if self.entries.is_empty() {
            return Err(Error::MenuConfiguration {
                reason: "a menu needs at least one control".to_string(),
            });
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.symbol.trim().is_empty() {
                return Err(Error::MenuConfiguration {
                    reason: format!("control #{i} has an empty symbol"),
                });
            }
            if self.entries[..i].iter().any(|e| e.symbol == entry.symbol) {
                return Err(Error::MenuConfiguration {
                    reason: format!("symbol {} is bound twice", entry.symbol),
                });
            }
        }

        Ok(ControlTable {
            entries: self.entries.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_controls_order() {
        let table = ControlTable::standard();
        let symbols: Vec<&str> = table.symbols().collect();
        assert_eq!(symbols, vec![PREV_SYMBOL, CLOSE_SYMBOL, NEXT_SYMBOL]);
        assert!(table.get(NEXT_SYMBOL).is_some());
        assert!(table.get("🔥").is_none());
    }

    #[test]
    fn test_builder_keeps_insertion_order() -> Result<()> {
        let table = ControlTable::builder()
            .control(NEXT_SYMBOL, NextPage)
            .control(CLOSE_SYMBOL, CloseMenu)
            .build()?;
        let symbols: Vec<&str> = table.symbols().collect();
        assert_eq!(symbols, vec![NEXT_SYMBOL, CLOSE_SYMBOL]);
        assert_eq!(table.len(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_symbol_fails_fast() {
        let result = ControlTable::builder()
            .control(NEXT_SYMBOL, NextPage)
            .control(NEXT_SYMBOL, PrevPage)
            .build();
        assert!(matches!(result, Err(Error::MenuConfiguration { .. })));
    }

    #[test]
    fn test_empty_table_and_blank_symbol_fail_fast() {
        let empty = ControlTable::builder().build();
        assert!(matches!(empty, Err(Error::MenuConfiguration { .. })));

        let blank = ControlTable::builder().control("  ", CloseMenu).build();
        assert!(matches!(blank, Err(Error::MenuConfiguration { .. })));
    }

    #[test]
    fn test_one_handler_bound_to_two_symbols() -> Result<()> {
        let next: Arc<dyn ControlHandler> = Arc::new(NextPage);
        let table = ControlTable::builder()
            .shared_control(NEXT_SYMBOL, Arc::clone(&next))
            .shared_control("\u{23E9}", Arc::clone(&next))
            .control(CLOSE_SYMBOL, CloseMenu)
            .build()?;

        let symbols: Vec<&str> = table.symbols().collect();
        assert_eq!(symbols, vec![NEXT_SYMBOL, "\u{23E9}", CLOSE_SYMBOL]);
        assert_eq!(table.len(), 3);

        let first = table.get(NEXT_SYMBOL).map(|e| Arc::clone(&e.handler));
        let second = table.get("\u{23E9}").map(|e| Arc::clone(&e.handler));
        assert!(first.zip(second).is_some_and(|(a, b)| Arc::ptr_eq(&a, &b)));
        // Two table entries plus the local binding
        assert_eq!(Arc::strong_count(&next), 3);
        Ok(())
    }

    #[test]
    fn test_shared_handler_still_rejects_duplicate_symbols() {
        let close: Arc<dyn ControlHandler> = Arc::new(CloseMenu);
        let result = ControlTable::builder()
            .shared_control(CLOSE_SYMBOL, Arc::clone(&close))
            .shared_control(CLOSE_SYMBOL, close)
            .build();
        assert!(matches!(result, Err(Error::MenuConfiguration { .. })));
    }
}
