//! Queries for the `reviewer_requests` table.
//!
//! Rows are always returned in submission order (`rowid`).

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::reviewer_request::ReviewerRequestRow;
use crate::models::{RequestStatus, ReviewerRequest};

const SELECT_COLUMNS: &str = r#"
    SELECT id, student_name, student_id, qualifications, date_submitted,
           status, instructor_note, reviewed_at, revision_count
    FROM reviewer_requests
"#;

fn into_requests(rows: Vec<ReviewerRequestRow>) -> Result<Vec<ReviewerRequest>, AppError> {
    rows.into_iter().map(ReviewerRequest::try_from).collect()
}

/// List requests still waiting for a decision.
pub async fn list_pending(pool: &DbPool) -> Result<Vec<ReviewerRequest>, AppError> {
    let rows: Vec<ReviewerRequestRow> =
        sqlx::query_as(&format!("{} WHERE status = ? ORDER BY rowid ASC", SELECT_COLUMNS))
            .bind(RequestStatus::Pending.as_str())
            .fetch_all(pool)
            .await?;

    into_requests(rows)
}

/// List every request regardless of status.
pub async fn list_all(pool: &DbPool) -> Result<Vec<ReviewerRequest>, AppError> {
    let rows: Vec<ReviewerRequestRow> =
        sqlx::query_as(&format!("{} ORDER BY rowid ASC", SELECT_COLUMNS))
            .fetch_all(pool)
            .await?;

    into_requests(rows)
}

/// Fetch one request by ID.
pub async fn get(pool: &DbPool, id: &str) -> Result<Option<ReviewerRequest>, AppError> {
    let row: Option<ReviewerRequestRow> =
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.map(ReviewerRequest::try_from).transpose()
}

/// Insert a new request. Fails with `Conflict` when the ID is taken.
pub async fn insert(pool: &DbPool, request: &ReviewerRequest) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO reviewer_requests (
            id, student_name, student_id, qualifications, date_submitted,
            status, instructor_note, reviewed_at, revision_count
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(request.id())
    .bind(request.student_name())
    .bind(request.student_id())
    .bind(request.qualifications())
    .bind(request.date_submitted())
    .bind(request.status().as_str())
    .bind(request.instructor_note())
    .bind(request.reviewed_at())
    .bind(request.revision_count())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::conflict(
            format!("reviewer request '{}' already exists", request.id()),
            request.id(),
        ));
    }

    Ok(())
}

/// Persist the review state of an existing request.
///
/// The write only applies while the stored `revision_count` still equals
/// `expected_revision`, i.e. nobody else decided the request since it was
/// read. Fails with `NotFound` when the ID is absent and with `Conflict`
/// when the stored row has moved on.
pub async fn update_review(
    pool: &DbPool,
    request: &ReviewerRequest,
    expected_revision: i64,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE reviewer_requests
        SET status = ?, instructor_note = ?, reviewed_at = ?, revision_count = ?
        WHERE id = ? AND revision_count = ?
        "#,
    )
    .bind(request.status().as_str())
    .bind(request.instructor_note())
    .bind(request.reviewed_at())
    .bind(request.revision_count())
    .bind(request.id())
    .bind(expected_revision)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return match get(pool, request.id()).await? {
            None => Err(AppError::not_found_with_id("ReviewerRequest", request.id())),
            Some(current) => Err(AppError::conflict(
                format!(
                    "request was changed elsewhere (now {}, revision {})",
                    current.status(),
                    current.revision_count()
                ),
                request.id(),
            )),
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (tempfile::TempDir, DbPool) {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_insert_and_list_preserves_order() {
        let (_dir, pool) = setup().await;

        for (id, name) in [("S103", "Charlie Lee"), ("S101", "Alice Johnson"), ("S102", "Bob Smith")] {
            insert(&pool, &ReviewerRequest::new(id, name)).await.unwrap();
        }

        let ids: Vec<String> = list_all(&pool)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["S103", "S101", "S102"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let (_dir, pool) = setup().await;
        let req = ReviewerRequest::new("S101", "Alice Johnson");

        insert(&pool, &req).await.unwrap();
        let err = insert(&pool, &req).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_review_and_pending_filter() {
        let (_dir, pool) = setup().await;
        let mut req = ReviewerRequest::new("S101", "Alice Johnson");
        insert(&pool, &req).await.unwrap();
        insert(&pool, &ReviewerRequest::new("S102", "Bob Smith")).await.unwrap();

        req.record_decision(RequestStatus::Denied, "insufficient", 1_700_000_000);
        update_review(&pool, &req, 0).await.unwrap();

        let stored = get(&pool, "S101").await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Denied);
        assert_eq!(stored.instructor_note(), "insufficient");
        assert_eq!(stored.reviewed_at(), Some(1_700_000_000));
        assert_eq!(stored.revision_count(), 1);

        let pending = list_pending(&pool).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), "S102");
    }

    #[tokio::test]
    async fn test_update_missing_request_is_not_found() {
        let (_dir, pool) = setup().await;
        let req = ReviewerRequest::new("S999", "Nobody");

        let err = update_review(&pool, &req, 0).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(get(&pool, "S999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let (_dir, pool) = setup().await;
        let original = ReviewerRequest::new("S101", "Alice Johnson");
        insert(&pool, &original).await.unwrap();

        let mut first = original.clone();
        first.record_decision(RequestStatus::Approved, "ok", 10);
        update_review(&pool, &first, 0).await.unwrap();

        // A second writer that read the row before the first decision.
        let mut stale = original.clone();
        stale.record_decision(RequestStatus::Denied, "no", 20);
        let err = update_review(&pool, &stale, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        let stored = get(&pool, "S101").await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Approved);
        assert_eq!(stored.instructor_note(), "ok");
        assert_eq!(stored.revision_count(), 1);
    }
}
