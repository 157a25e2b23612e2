//! Console session: a review console bound to its store and instructor.
//!
//! Decisions are applied to the console first and then saved. When the save
//! fails, the row is rolled back to its previous state and the failure is
//! shown inline on that row; the rest of the console keeps working.

use crate::error::AppError;
use crate::models::{Instructor, ReviewerRequest};
use crate::services::request_store::RequestStore;
use crate::services::review_console::{ReviewConsole, RowBinding, RowCommand, TransitionPolicy};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session shared between request handlers. All mutations go through the
/// mutex, so decisions on the same request are serialized.
pub type SharedSession = Arc<Mutex<ConsoleSession>>;

/// Which requests a session shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadScope {
    /// Only requests waiting for a decision.
    #[default]
    Pending,
    /// Every request, so decided ones can be revised.
    All,
}

pub struct ConsoleSession {
    store: Arc<dyn RequestStore>,
    instructor: Instructor,
    scope: LoadScope,
    console: ReviewConsole,
    load_error: Option<String>,
}

impl ConsoleSession {
    /// Open a session and load the pending requests.
    ///
    /// A failed load leaves the console empty with `load_error` set.
    pub async fn open(
        store: Arc<dyn RequestStore>,
        instructor: Instructor,
        policy: TransitionPolicy,
    ) -> Self {
        Self::open_scoped(store, instructor, policy, LoadScope::Pending).await
    }

    /// Open a session showing the requests selected by `scope`.
    pub async fn open_scoped(
        store: Arc<dyn RequestStore>,
        instructor: Instructor,
        policy: TransitionPolicy,
        scope: LoadScope,
    ) -> Self {
        let mut session = Self {
            store,
            instructor,
            scope,
            console: ReviewConsole::render(Vec::new(), policy),
            load_error: None,
        };
        session.reload().await;
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Re-read requests from the store, discarding note inputs.
    pub async fn reload(&mut self) {
        let policy = self.console.policy();
        let loaded = match self.scope {
            LoadScope::Pending => self.store.load_pending_requests().await,
            LoadScope::All => self.store.load_all_requests().await,
        };
        match loaded {
            Ok(requests) => {
                log::info!("[console] Loaded {} request(s) ({:?})", requests.len(), self.scope);
                self.console = ReviewConsole::render(requests, policy);
                self.load_error = None;
            }
            Err(e) => {
                log::warn!("[console] Failed to load reviewer requests: {}", e);
                self.console = ReviewConsole::render(Vec::new(), policy);
                self.load_error = Some(e.to_string());
            }
        }
    }

    pub fn instructor(&self) -> &Instructor {
        &self.instructor
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.console.policy()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn console(&self) -> &ReviewConsole {
        &self.console
    }

    pub fn bindings(&self) -> Vec<RowBinding> {
        self.console.bindings()
    }

    pub fn set_note_input(&mut self, request_id: &str, text: impl Into<String>) -> Result<(), AppError> {
        self.console.set_note_input(request_id, text)
    }

    /// Apply a row command and persist the result.
    ///
    /// The save is conditional on the stored revision the row was loaded
    /// with. When another session decided the request first, the row is
    /// refreshed from the store and the conflict is reported on it.
    pub async fn invoke(&mut self, command: &RowCommand) -> Result<ReviewerRequest, AppError> {
        let snapshot = self.console.request(&command.request_id)?.clone();

        let updated = match self.console.dispatch(command) {
            Ok(updated) => updated.clone(),
            Err(e) => {
                if !e.is_not_found() {
                    self.console.report_error(&command.request_id, e.to_string())?;
                }
                return Err(e);
            }
        };

        if let Err(e) = self.store.save_request(&updated, snapshot.revision_count()).await {
            log::warn!(
                "[console] Failed to save decision for {}: {}",
                command.request_id,
                e
            );
            self.console.restore(snapshot)?;
            if matches!(e, AppError::Conflict { .. }) {
                self.refresh_row(&command.request_id).await;
            }
            self.console.report_error(&command.request_id, e.to_string())?;
            return Err(e);
        }

        log::info!(
            "[console] {} recorded {} for {}",
            self.instructor.username,
            updated.status(),
            updated.id()
        );
        Ok(updated)
    }

    /// Replace one row's request with the stored copy. Read failures leave
    /// the row as it is.
    async fn refresh_row(&mut self, request_id: &str) {
        match self.store.get_request(request_id).await {
            Ok(Some(current)) => {
                if let Err(e) = self.console.restore(current) {
                    log::warn!("[console] Could not refresh {}: {}", request_id, e);
                }
            }
            Ok(None) => log::warn!("[console] {} no longer exists", request_id),
            Err(e) => log::warn!("[console] Could not re-read {}: {}", request_id, e),
        }
    }
}
