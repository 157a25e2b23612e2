//! Reviewer request model.
//!
//! A reviewer request is a student's application for reviewer privileges,
//! waiting for an instructor to approve or deny it.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Review status of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    /// Lowercase text form used in labels and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Whether an instructor has decided on the request.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    /// Parse a status, case-insensitively. Anything outside the three
    /// known statuses is rejected rather than coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(AppError::invalid_input_field(
                format!("unknown request status '{}'", other),
                "status",
            )),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's request to become a reviewer.
///
/// Identity and descriptive fields are fixed at construction; only the
/// review state (`status`, `instructor_note`, and the decision bookkeeping)
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerRequest {
    id: String,
    student_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qualifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_submitted: Option<String>,
    status: RequestStatus,
    instructor_note: String,
    /// Unix timestamp of the latest decision.
    reviewed_at: Option<i64>,
    /// Number of decisions recorded against this request.
    revision_count: i64,
}

impl ReviewerRequest {
    /// Create a pending request with an empty instructor note.
    pub fn new(id: impl Into<String>, student_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            student_name: student_name.into(),
            student_id: None,
            qualifications: None,
            date_submitted: None,
            status: RequestStatus::Pending,
            instructor_note: String::new(),
            reviewed_at: None,
            revision_count: 0,
        }
    }

    pub fn with_student_id(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = Some(student_id.into());
        self
    }

    pub fn with_qualifications(mut self, qualifications: impl Into<String>) -> Self {
        self.qualifications = Some(qualifications.into());
        self
    }

    pub fn with_date_submitted(mut self, date_submitted: impl Into<String>) -> Self {
        self.date_submitted = Some(date_submitted.into());
        self
    }

    /// Override the initial status (defaults to pending).
    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    pub fn qualifications(&self) -> Option<&str> {
        self.qualifications.as_deref()
    }

    pub fn date_submitted(&self) -> Option<&str> {
        self.date_submitted.as_deref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn instructor_note(&self) -> &str {
        &self.instructor_note
    }

    pub fn reviewed_at(&self) -> Option<i64> {
        self.reviewed_at
    }

    pub fn revision_count(&self) -> i64 {
        self.revision_count
    }

    /// Overwrite the status. No transition rules are applied here; the
    /// console decides which transitions are allowed.
    pub fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    /// Overwrite the instructor note.
    pub fn set_instructor_note(&mut self, note: impl Into<String>) {
        self.instructor_note = note.into();
    }

    /// Record an instructor decision: status first, then the note.
    pub fn record_decision(&mut self, status: RequestStatus, note: impl Into<String>, at: i64) {
        self.set_status(status);
        self.set_instructor_note(note);
        self.reviewed_at = Some(at);
        self.revision_count += 1;
    }

    /// The identifying field shown in the label: the student ID when known,
    /// otherwise the request ID.
    pub fn identifier(&self) -> &str {
        self.student_id.as_deref().unwrap_or(&self.id)
    }

    /// Row label, e.g. `Alice Johnson (S101) - pending`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReviewerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.student_name, self.identifier(), self.status)
    }
}

/// Raw `reviewer_requests` row. Status is kept as text until validated.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewerRequestRow {
    pub id: String,
    pub student_name: String,
    pub student_id: Option<String>,
    pub qualifications: Option<String>,
    pub date_submitted: Option<String>,
    pub status: String,
    pub instructor_note: String,
    pub reviewed_at: Option<i64>,
    pub revision_count: i64,
}

impl TryFrom<ReviewerRequestRow> for ReviewerRequest {
    type Error = AppError;

    fn try_from(row: ReviewerRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            student_name: row.student_name,
            student_id: row.student_id,
            qualifications: row.qualifications,
            date_submitted: row.date_submitted,
            instructor_note: row.instructor_note,
            reviewed_at: row.reviewed_at,
            revision_count: row.revision_count,
        })
    }
}

/// Data required to submit a new reviewer request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewerRequest {
    /// Request ID. A UUID is generated when absent.
    pub id: Option<String>,

    /// Name of the submitting student.
    pub student_name: String,

    pub student_id: Option<String>,

    pub qualifications: Option<String>,

    /// Submission date. Defaults to today (`YYYY-MM-DD`).
    pub date_submitted: Option<String>,
}

impl NewReviewerRequest {
    /// Validate the submission and build the pending entity.
    pub fn into_request(self) -> Result<ReviewerRequest, AppError> {
        let student_name = self.student_name.trim();
        if student_name.is_empty() {
            return Err(AppError::invalid_input_field(
                "student name must not be empty",
                "studentName",
            ));
        }

        let id = match self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(AppError::invalid_input_field("id must not be empty", "id"));
            }
            Some(id) => id.trim().to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };

        let date_submitted = self
            .date_submitted
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

        let mut request = ReviewerRequest::new(id, student_name).with_date_submitted(date_submitted);
        if let Some(student_id) = self.student_id.filter(|s| !s.trim().is_empty()) {
            request = request.with_student_id(student_id);
        }
        if let Some(qualifications) = self.qualifications.filter(|s| !s.trim().is_empty()) {
            request = request.with_qualifications(qualifications);
        }
        Ok(request)
    }
}
