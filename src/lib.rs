//! Keyboard shortcut dispatcher for the carbon footprint management front end.
//!
//! Desktop-width pages get four page-level shortcuts:
//!
//! | Key       | Action                                             |
//! |-----------|----------------------------------------------------|
//! | `/`       | focus the page's search field                      |
//! | `Shift+?` | open the keyboard shortcuts help                   |
//! | `N`       | create a company or product, depending on the page |
//! | `Esc`     | close open dialogs and menus                       |
//!
//! The host supplies the page through [`dom::Document`], navigation through
//! [`context::Navigator`] and persisted selections through
//! [`store::SelectionStore`]. [`session::ShortcutSession`] ties them together.

pub mod actions;
pub mod announce;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod dom;
pub mod error;
pub mod guard;
pub mod keybindings;
pub mod logging;
pub mod mode;
pub mod routes;
pub mod session;
pub mod store;

pub use error::{Error, Result};
