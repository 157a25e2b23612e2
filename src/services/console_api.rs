//! HTTP routes for the console page server.
//!
//! Two surfaces share the same command handlers:
//! - the HTML page (`/`, form posts that redirect back to `/`);
//! - the JSON API under `/api`, for scripts and richer frontends.

use crate::commands::review::{self, ConsoleView, DecisionInput, NoteInput};
use crate::error::AppError;
use crate::models::ReviewerRequest;
use crate::services::console_page::{render_console_page, render_navigation_page};
use crate::services::console_server::ConsoleState;
use crate::services::navigation::{HomePage, NavigationEvent, NavigationTarget};
use crate::services::review_console::RowBinding;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

// ── Error handling ───────────────────────────────────────────────────────────

/// JSON error body.
#[derive(Serialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Wrapper to make AppError usable as an axum error response.
struct ApiErr(AppError);

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        (
            status,
            Json(ApiError {
                code: code.to_string(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

// ── Request bodies ───────────────────────────────────────────────────────────

/// Body of `POST /api/requests/{id}/approve|deny`. The body itself is
/// optional; without one the row's current note input is used.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionBody {
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    expected_status: Option<String>,
}

/// Body of `PUT /api/requests/{id}/note`.
#[derive(Debug, Deserialize)]
struct NoteBody {
    note: String,
}

/// Form fields posted by a console row.
#[derive(Debug, Default, Deserialize)]
struct RowForm {
    #[serde(default)]
    note: String,
}

// ── Route builders ───────────────────────────────────────────────────────────

/// Routes for the HTML console page.
pub fn page_routes() -> Router<ConsoleState> {
    Router::new()
        .route("/", get(console_page))
        .route("/requests/{id}/approve", post(approve_from_form))
        .route("/requests/{id}/deny", post(deny_from_form))
        .route("/navigate/{target}", post(navigate_from_form))
}

/// JSON API routes.
pub fn api_routes() -> Router<ConsoleState> {
    Router::new()
        .route("/api/home", get(get_home))
        .route("/api/requests", get(get_requests))
        .route("/api/requests/reload", post(reload_requests))
        .route("/api/requests/{id}/note", put(set_note))
        .route("/api/requests/{id}/approve", post(approve_request))
        .route("/api/requests/{id}/deny", post(deny_request))
        .route("/api/navigate/{target}", post(navigate))
}

/// Fallback: JSON 404 for unknown API paths, plain 404 elsewhere.
pub async fn not_found(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return ApiErr(AppError::NotFound {
            resource: format!("route {}", uri.path()),
            id: None,
        })
        .into_response();
    }
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

// ── Page handlers ────────────────────────────────────────────────────────────

async fn home_page(state: &ConsoleState) -> HomePage {
    HomePage::new(state.session.lock().await.instructor().clone())
}

/// GET /: the console page.
async fn console_page(State(state): State<ConsoleState>) -> Html<String> {
    let home = home_page(&state).await;
    let view = review::get_reviewer_requests(&state.session).await;
    Html(render_console_page(&home, &view))
}

/// Decision failures other than unknown rows are already shown inline on
/// the row, so the form handlers just send the browser back to the page.
async fn decide_from_form(
    state: ConsoleState,
    id: String,
    form: RowForm,
    approve: bool,
) -> Result<Redirect, ApiErr> {
    let input = DecisionInput {
        request_id: id,
        note: Some(form.note),
        expected_status: None,
    };

    let result = if approve {
        review::approve_request(&state.session, input).await
    } else {
        review::deny_request(&state.session, input).await
    };

    match result {
        Err(e) if e.is_not_found() => Err(e.into()),
        _ => Ok(Redirect::to("/")),
    }
}

/// POST /requests/{id}/approve
async fn approve_from_form(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    Form(form): Form<RowForm>,
) -> Result<Redirect, ApiErr> {
    decide_from_form(state, id, form, true).await
}

/// POST /requests/{id}/deny
async fn deny_from_form(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    Form(form): Form<RowForm>,
) -> Result<Redirect, ApiErr> {
    decide_from_form(state, id, form, false).await
}

/// POST /navigate/{target}
async fn navigate_from_form(
    State(state): State<ConsoleState>,
    Path(target): Path<String>,
) -> Result<Response, ApiErr> {
    let event = emit_navigation(&state, &target).await?;
    if event.target == NavigationTarget::ApproveDenyRequests {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(render_navigation_page(&event)).into_response())
}

// ── API handlers ─────────────────────────────────────────────────────────────

/// GET /api/home: greeting and navigation menu.
async fn get_home(State(state): State<ConsoleState>) -> Json<HomePage> {
    Json(home_page(&state).await)
}

/// GET /api/requests: current console rows.
async fn get_requests(State(state): State<ConsoleState>) -> Json<ConsoleView> {
    Json(review::get_reviewer_requests(&state.session).await)
}

/// POST /api/requests/reload: re-read pending requests.
async fn reload_requests(State(state): State<ConsoleState>) -> Json<ConsoleView> {
    Json(review::reload_requests(&state.session).await)
}

/// PUT /api/requests/{id}/note: update a row's note input.
async fn set_note(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Result<Json<RowBinding>, ApiErr> {
    let binding = review::set_note_input(
        &state.session,
        NoteInput {
            request_id: id,
            note: body.note,
        },
    )
    .await?;
    Ok(Json(binding))
}

/// POST /api/requests/{id}/approve
async fn approve_request(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<ReviewerRequest>, ApiErr> {
    let input = decision_input(id, body);
    Ok(Json(review::approve_request(&state.session, input).await?))
}

/// POST /api/requests/{id}/deny
async fn deny_request(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<ReviewerRequest>, ApiErr> {
    let input = decision_input(id, body);
    Ok(Json(review::deny_request(&state.session, input).await?))
}

/// POST /api/navigate/{target}
async fn navigate(
    State(state): State<ConsoleState>,
    Path(target): Path<String>,
) -> Result<Json<NavigationEvent>, ApiErr> {
    Ok(Json(emit_navigation(&state, &target).await?))
}

fn decision_input(id: String, body: Option<Json<DecisionBody>>) -> DecisionInput {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    DecisionInput {
        request_id: id,
        note: body.note,
        expected_status: body.expected_status,
    }
}

async fn emit_navigation(state: &ConsoleState, target: &str) -> Result<NavigationEvent, AppError> {
    let target: NavigationTarget = target.parse()?;
    let instructor = state.session.lock().await.instructor().clone();
    Ok(state.navigator.navigate(&instructor, target))
}
