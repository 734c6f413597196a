//! Reaction-driven paginated menus.
//!
//! A menu shows one page of content, attaches control reactions, and waits for the
//! invoking user to react. The matching handler computes the next session state and the
//! loop renders again, until a handler closes the menu or nobody reacts in time.
//!
//! Nothing here depends on serenity; the chat platform is reached through [`MenuTransport`].

pub mod controller;
pub mod controls;
pub mod handlers;
pub mod pages;
pub mod reactions;
pub mod session;
pub mod transport;

pub use controller::{MenuOutcome, clear_menu_reactions, run_menu};
pub use controls::{
    CLOSE_SYMBOL, ControlEntry, ControlHandler, ControlTable, ControlTableBuilder, Dispatch,
    NEXT_SYMBOL, PREV_SYMBOL, Transition,
};
pub use handlers::{CloseMenu, NextPage, PrevPage};
pub use pages::{DEFAULT_PAGE_SIZE, PageSet, next_index, prev_index};
pub use reactions::start_adding_reactions;
pub use session::{DEFAULT_TIMEOUT_SECS, Session};
pub use transport::{
    InputFilter, MenuTransport, MessageHandle, ReactionInput, ReactionOwner, RenderedPage,
    TransportError, TransportResult,
};
