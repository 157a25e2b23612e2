//! Review console: one interactive row per reviewer request.
//!
//! The console is toolkit-agnostic. Each row carries a label, a note input
//! and two commands (approve/deny) as plain values; an adapter renders the
//! rows and hands commands back to [`ReviewConsole::dispatch`]. Commands only
//! touch the row they address.

use crate::error::AppError;
use crate::models::{RequestStatus, ReviewerRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Whether a decided request may be decided again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Every approve/deny overwrites status and note; the last one wins.
    #[default]
    LastWriteWins,
    /// Only pending requests accept a decision.
    FinalDecision,
}

impl TransitionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastWriteWins => "last_write_wins",
            Self::FinalDecision => "final_decision",
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = AppError;

    /// Accepts the snake_case settings form and its kebab-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "final_decision" => Ok(Self::FinalDecision),
            other => Err(AppError::invalid_input_field(
                format!("unknown transition policy '{}'", other),
                "transitionPolicy",
            )),
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instructor decision carried by a row command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    /// Status the request ends up in.
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Deny => RequestStatus::Denied,
        }
    }

    /// Button caption.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Deny => "Deny",
        }
    }
}

/// A command bound to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCommand {
    pub request_id: String,
    pub decision: Decision,
    /// When set, the command only applies if the request is currently in
    /// this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<RequestStatus>,
}

impl RowCommand {
    pub fn approve(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            decision: Decision::Approve,
            expected_status: None,
        }
    }

    pub fn deny(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            decision: Decision::Deny,
            expected_status: None,
        }
    }

    pub fn expecting(mut self, status: RequestStatus) -> Self {
        self.expected_status = Some(status);
        self
    }
}

/// Snapshot of one rendered row, handed to adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowBinding {
    pub index: usize,
    pub request: ReviewerRequest,
    pub label: String,
    pub note_input: String,
    pub approve: RowCommand,
    pub deny: RowCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
struct ConsoleRow {
    request: ReviewerRequest,
    label: String,
    note_input: String,
    error: Option<String>,
}

impl ConsoleRow {
    fn new(request: ReviewerRequest) -> Self {
        Self {
            label: request.label(),
            request,
            note_input: String::new(),
            error: None,
        }
    }

    fn refresh_label(&mut self) {
        self.label = self.request.label();
    }
}

/// In-memory console over an ordered list of requests.
#[derive(Debug, Clone)]
pub struct ReviewConsole {
    rows: Vec<ConsoleRow>,
    policy: TransitionPolicy,
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl ReviewConsole {
    /// Render one row per request, preserving input order.
    pub fn render(requests: Vec<ReviewerRequest>, policy: TransitionPolicy) -> Self {
        Self {
            rows: requests.into_iter().map(ConsoleRow::new).collect(),
            policy,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Current row bindings, in render order.
    pub fn bindings(&self) -> Vec<RowBinding> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.binding_at(index, row))
            .collect()
    }

    /// Binding for a single request.
    pub fn binding(&self, request_id: &str) -> Result<RowBinding, AppError> {
        let index = self.position(request_id)?;
        Ok(self.binding_at(index, &self.rows[index]))
    }

    fn binding_at(&self, index: usize, row: &ConsoleRow) -> RowBinding {
        let id = row.request.id();
        RowBinding {
            index,
            request: row.request.clone(),
            label: row.label.clone(),
            note_input: row.note_input.clone(),
            approve: RowCommand::approve(id),
            deny: RowCommand::deny(id),
            error: row.error.clone(),
        }
    }

    pub fn request(&self, request_id: &str) -> Result<&ReviewerRequest, AppError> {
        let index = self.position(request_id)?;
        Ok(&self.rows[index].request)
    }

    /// Replace the note input of a row. The value is only read when a
    /// command fires.
    pub fn set_note_input(&mut self, request_id: &str, text: impl Into<String>) -> Result<(), AppError> {
        let row = self.row_mut(request_id)?;
        row.note_input = text.into();
        Ok(())
    }

    /// Run a row command: status, then note from the row's input, then the
    /// label. Returns the updated request.
    pub fn dispatch(&mut self, command: &RowCommand) -> Result<&ReviewerRequest, AppError> {
        self.dispatch_at(command, now())
    }

    /// Same as [`dispatch`](Self::dispatch) with an explicit decision time.
    pub fn dispatch_at(&mut self, command: &RowCommand, at: i64) -> Result<&ReviewerRequest, AppError> {
        let policy = self.policy;
        let row = self.row_mut(&command.request_id)?;
        let current = row.request.status();

        if let Some(expected) = command.expected_status {
            if expected != current {
                return Err(AppError::conflict(
                    format!("expected request to be {} but it is {}", expected, current),
                    &command.request_id,
                ));
            }
        }

        if policy == TransitionPolicy::FinalDecision && current.is_decided() {
            return Err(AppError::conflict(
                format!("request already {}", current),
                &command.request_id,
            ));
        }

        let note = row.note_input.clone();
        row.request.record_decision(command.decision.target_status(), note, at);
        row.error = None;
        row.refresh_label();

        log::debug!(
            "[console] {} -> {} ({})",
            command.request_id,
            row.request.status(),
            row.label
        );
        Ok(&row.request)
    }

    /// Put a request back to a previous state, e.g. after a failed save.
    pub fn restore(&mut self, snapshot: ReviewerRequest) -> Result<(), AppError> {
        let row = self.row_mut(snapshot.id())?;
        row.request = snapshot;
        row.refresh_label();
        Ok(())
    }

    /// Attach an inline error message to a row.
    pub fn report_error(&mut self, request_id: &str, message: impl Into<String>) -> Result<(), AppError> {
        let row = self.row_mut(request_id)?;
        row.error = Some(message.into());
        Ok(())
    }

    fn position(&self, request_id: &str) -> Result<usize, AppError> {
        self.rows
            .iter()
            .position(|row| row.request.id() == request_id)
            .ok_or_else(|| AppError::not_found_with_id("ReviewerRequest", request_id))
    }

    fn row_mut(&mut self, request_id: &str) -> Result<&mut ConsoleRow, AppError> {
        let index = self.position(request_id)?;
        Ok(&mut self.rows[index])
    }
}
