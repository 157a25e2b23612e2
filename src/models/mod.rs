//! Data models for the application.
//!
//! These models represent the entities stored in the local SQLite database
//! and exchanged with the console adapters.

pub mod instructor;
pub mod reviewer_request;

// Re-exports for convenient access
pub use instructor::Instructor;
pub use reviewer_request::{NewReviewerRequest, RequestStatus, ReviewerRequest};
