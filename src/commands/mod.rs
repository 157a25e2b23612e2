//! Command handlers shared by the terminal and page adapters.
//!
//! - `review`: list, note, approve/deny, submit and seed operations
//! - `settings`: application settings

pub mod review;
pub mod settings;

pub use review::{
    approve_request, deny_request, get_reviewer_requests, reload_requests, seed_demo_requests,
    set_note_input, submit_request, ConsoleView, DecisionInput, NoteInput,
};
pub use settings::{load_settings, save_settings, update_settings, AppSettings, SettingsUpdate};
