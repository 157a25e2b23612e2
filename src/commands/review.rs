//! Review commands shared by the terminal and page adapters.
//!
//! Inputs are plain deserializable structs so the same handlers serve CLI
//! arguments and JSON request bodies.

use crate::error::AppError;
use crate::models::{Instructor, NewReviewerRequest, RequestStatus, ReviewerRequest};
use crate::services::console_session::SharedSession;
use crate::services::request_store::RequestStore;
use crate::services::review_console::{Decision, RowBinding, RowCommand, TransitionPolicy};
use serde::{Deserialize, Serialize};

/// Input for approve/deny commands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    /// Target request ID.
    pub request_id: String,
    /// Replaces the row's note input before the decision is applied.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional revision guard, e.g. `"pending"`.
    #[serde(default)]
    pub expected_status: Option<String>,
}

/// Input for updating a row's note input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub request_id: String,
    pub note: String,
}

/// Everything an adapter needs to draw the console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleView {
    pub instructor: Instructor,
    pub policy: TransitionPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    pub rows: Vec<RowBinding>,
}

/// Get the current console rows.
pub async fn get_reviewer_requests(session: &SharedSession) -> ConsoleView {
    let session = session.lock().await;
    ConsoleView {
        instructor: session.instructor().clone(),
        policy: session.policy(),
        load_error: session.load_error().map(str::to_string),
        rows: session.bindings(),
    }
}

/// Reload pending requests from the store.
pub async fn reload_requests(session: &SharedSession) -> ConsoleView {
    session.lock().await.reload().await;
    get_reviewer_requests(session).await
}

/// Update the note input of a row.
pub async fn set_note_input(session: &SharedSession, input: NoteInput) -> Result<RowBinding, AppError> {
    let mut session = session.lock().await;
    session.set_note_input(&input.request_id, input.note)?;
    session.console().binding(&input.request_id)
}

/// Approve a reviewer request.
pub async fn approve_request(
    session: &SharedSession,
    input: DecisionInput,
) -> Result<ReviewerRequest, AppError> {
    decide(session, input, Decision::Approve).await
}

/// Deny a reviewer request.
pub async fn deny_request(
    session: &SharedSession,
    input: DecisionInput,
) -> Result<ReviewerRequest, AppError> {
    decide(session, input, Decision::Deny).await
}

async fn decide(
    session: &SharedSession,
    input: DecisionInput,
    decision: Decision,
) -> Result<ReviewerRequest, AppError> {
    let expected_status = input
        .expected_status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()?;

    let command = RowCommand {
        request_id: input.request_id,
        decision,
        expected_status,
    };

    let mut session = session.lock().await;
    if let Some(note) = input.note {
        session.set_note_input(&command.request_id, note)?;
    }
    session.invoke(&command).await
}

/// Submit a new reviewer request.
pub async fn submit_request(
    store: &dyn RequestStore,
    input: NewReviewerRequest,
) -> Result<ReviewerRequest, AppError> {
    let request = input.into_request()?;
    store.insert_request(&request).await?;
    log::info!("[review] Submitted request {} for {}", request.id(), request.student_name());
    Ok(request)
}

/// The three demo requests used by `seed`.
pub fn demo_requests() -> Vec<ReviewerRequest> {
    [
        ("S101", "Alice Johnson"),
        ("S102", "Bob Smith"),
        ("S103", "Charlie Lee"),
    ]
    .into_iter()
    .map(|(id, name)| ReviewerRequest::new(id, name))
    .collect()
}

/// Insert the demo requests, skipping any that already exist.
///
/// # Returns
/// The requests that were inserted.
pub async fn seed_demo_requests(store: &dyn RequestStore) -> Result<Vec<ReviewerRequest>, AppError> {
    let mut inserted = Vec::new();
    for request in demo_requests() {
        match store.insert_request(&request).await {
            Ok(()) => inserted.push(request),
            Err(AppError::Conflict { .. }) => {
                log::debug!("[review] Demo request {} already present", request.id());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}
