//! Business logic services.
//!
//! - `review_console`: toolkit-agnostic console rows and the decision rules
//! - `console_session`: a console bound to its store, with inline error reporting
//! - `request_store`: storage abstraction (SQLite and in-memory)
//! - `navigation`: instructor home page and navigation events
//! - `text_view`: terminal rendering
//! - `console_page`, `console_api`, `console_server`: HTML page and JSON API

pub mod console_api;
pub mod console_page;
pub mod console_server;
pub mod console_session;
pub mod navigation;
pub mod request_store;
pub mod review_console;
pub mod text_view;

pub use console_session::{ConsoleSession, LoadScope, SharedSession};
pub use request_store::{MemoryRequestStore, RequestStore, SqliteRequestStore};
pub use review_console::{Decision, ReviewConsole, RowBinding, RowCommand, TransitionPolicy};
