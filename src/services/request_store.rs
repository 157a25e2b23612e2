//! Data-access abstraction for reviewer requests.
//!
//! The console only depends on the `RequestStore` trait. The SQLite store is
//! used by both adapters; the in-memory store backs tests and demo sessions.

use crate::db::pool::DbPool;
use crate::db::reviewer_requests;
use crate::error::AppError;
use crate::models::ReviewerRequest;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage backend for reviewer requests.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Load requests still waiting for a decision, in submission order.
    async fn load_pending_requests(&self) -> Result<Vec<ReviewerRequest>, AppError>;

    /// Load every request, in submission order.
    async fn load_all_requests(&self) -> Result<Vec<ReviewerRequest>, AppError>;

    /// Fetch a single request.
    async fn get_request(&self, id: &str) -> Result<Option<ReviewerRequest>, AppError>;

    /// Add a new request. Duplicate IDs fail with `Conflict`.
    async fn insert_request(&self, request: &ReviewerRequest) -> Result<(), AppError>;

    /// Persist the review state of an existing request, provided the stored
    /// copy is still at `expected_revision`. Unknown IDs fail with
    /// `NotFound`; a request decided elsewhere in the meantime fails with
    /// `Conflict` and is left untouched.
    async fn save_request(
        &self,
        request: &ReviewerRequest,
        expected_revision: i64,
    ) -> Result<(), AppError>;
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteRequestStore {
    pool: DbPool,
}

impl SqliteRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for SqliteRequestStore {
    async fn load_pending_requests(&self) -> Result<Vec<ReviewerRequest>, AppError> {
        reviewer_requests::list_pending(&self.pool).await
    }

    async fn load_all_requests(&self) -> Result<Vec<ReviewerRequest>, AppError> {
        reviewer_requests::list_all(&self.pool).await
    }

    async fn get_request(&self, id: &str) -> Result<Option<ReviewerRequest>, AppError> {
        reviewer_requests::get(&self.pool, id).await
    }

    async fn insert_request(&self, request: &ReviewerRequest) -> Result<(), AppError> {
        reviewer_requests::insert(&self.pool, request).await
    }

    async fn save_request(
        &self,
        request: &ReviewerRequest,
        expected_revision: i64,
    ) -> Result<(), AppError> {
        reviewer_requests::update_review(&self.pool, request, expected_revision).await
    }
}

/// In-memory store.
///
/// Requests live in a `Vec` behind a `RwLock`, so insertion order is the
/// iteration order. All state is lost when the store is dropped.
#[derive(Default)]
pub struct MemoryRequestStore {
    requests: RwLock<Vec<ReviewerRequest>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `requests`.
    pub fn with_requests(requests: Vec<ReviewerRequest>) -> Self {
        Self {
            requests: RwLock::new(requests),
        }
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn load_pending_requests(&self) -> Result<Vec<ReviewerRequest>, AppError> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| !r.status().is_decided())
            .cloned()
            .collect())
    }

    async fn load_all_requests(&self) -> Result<Vec<ReviewerRequest>, AppError> {
        Ok(self.requests.read().await.clone())
    }

    async fn get_request(&self, id: &str) -> Result<Option<ReviewerRequest>, AppError> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id() == id).cloned())
    }

    async fn insert_request(&self, request: &ReviewerRequest) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        if requests.iter().any(|r| r.id() == request.id()) {
            return Err(AppError::conflict(
                format!("reviewer request '{}' already exists", request.id()),
                request.id(),
            ));
        }
        requests.push(request.clone());
        Ok(())
    }

    async fn save_request(
        &self,
        request: &ReviewerRequest,
        expected_revision: i64,
    ) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        let slot = requests
            .iter_mut()
            .find(|r| r.id() == request.id())
            .ok_or_else(|| AppError::not_found_with_id("ReviewerRequest", request.id()))?;

        if slot.revision_count() != expected_revision {
            return Err(AppError::conflict(
                format!(
                    "request was changed elsewhere (now {}, revision {})",
                    slot.status(),
                    slot.revision_count()
                ),
                request.id(),
            ));
        }

        *slot = request.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestStatus;

    #[tokio::test]
    async fn test_memory_store_pending_filter() {
        let store = MemoryRequestStore::with_requests(vec![
            ReviewerRequest::new("S101", "Alice Johnson"),
            ReviewerRequest::new("S102", "Bob Smith").with_status(RequestStatus::Approved),
            ReviewerRequest::new("S103", "Charlie Lee"),
        ]);

        let pending = store.load_pending_requests().await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["S101", "S103"]);
        assert_eq!(store.load_all_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_store_save_unknown_is_not_found() {
        let store = MemoryRequestStore::new();
        let err = store
            .save_request(&ReviewerRequest::new("S404", "Ghost"), 0)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_memory_store_save_overwrites() {
        let store = MemoryRequestStore::new();
        let mut req = ReviewerRequest::new("S101", "Alice Johnson");
        store.insert_request(&req).await.unwrap();

        req.record_decision(RequestStatus::Approved, "ok", 1);
        store.save_request(&req, 0).await.unwrap();

        let stored = store.get_request("S101").await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Approved);
        assert_eq!(stored.instructor_note(), "ok");
    }

    #[tokio::test]
    async fn test_memory_store_stale_save_conflicts() {
        let store = MemoryRequestStore::with_requests(vec![ReviewerRequest::new(
            "S101",
            "Alice Johnson",
        )]);
        let original = store.get_request("S101").await.unwrap().unwrap();

        let mut first = original.clone();
        first.record_decision(RequestStatus::Approved, "ok", 1);
        store.save_request(&first, 0).await.unwrap();

        let mut stale = original;
        stale.record_decision(RequestStatus::Denied, "no", 2);
        let err = store.save_request(&stale, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        let stored = store.get_request("S101").await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Approved);
        assert_eq!(stored.revision_count(), 1);
    }
}
