//! Routes for the spread session context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use arcana_session::OpenOutcome;
use arcana_session::application::command_handlers;
use arcana_session::application::query_handlers::{self, SessionView};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// The layout to run the session on. Unknown ids fall back to the
    /// default single-card layout.
    pub layout_id: String,
}

/// Request body for POST /{id}/question and /{id}/start.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    /// The user's question.
    pub question: String,
}

/// Request body for POST /{id}/open.
#[derive(Debug, Deserialize)]
pub struct OpenCardRequest {
    /// The position to reveal.
    pub position_id: u8,
}

/// Response body for POST /{id}/open.
#[derive(Debug, Serialize)]
pub struct OpenCardResponse {
    /// What happened: `opened`, `denied` or `ignored`.
    pub outcome: &'static str,
    /// The position the policy expects next, on denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<u8>,
    /// Whether the caller should warn the user (first denial of the
    /// episode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn: Option<bool>,
    /// Whether the reveal completed the spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_open: Option<bool>,
    /// Session snapshot after the attempt.
    pub session: SessionView,
}

/// POST / — create a session on a layout.
#[instrument(skip(state, request), fields(layout_id = %request.layout_id))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let (id, entry) = state.insert_session(&request.layout_id)?;
    info!(session_id = %id, "session created");
    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// GET /{id}
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.session(id)?;
    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// POST /{id}/question
#[instrument(skip(state, request))]
async fn set_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.session(id)?;
    command_handlers::handle_set_question(&entry.session, &request.question)?;
    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// POST /{id}/start — cancel-then-restart.
///
/// An active timeline is superseded before anything else happens, so a
/// stale run can never advance stages after this request. The session is
/// then reset, redrawn and handed to a fresh timeline run.
#[instrument(skip(state, request))]
async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.session(id)?;

    entry.timeline.cancel();
    command_handlers::handle_reset(&entry.session)?;
    command_handlers::handle_start(
        &entry.session,
        &request.question,
        state.clock.as_ref(),
        &state.rng,
    )?;

    // Warm the ad inventory while the dealing animation plays.
    let ads = state.ads.clone();
    tokio::spawn(async move {
        ads.preload(&arcana_reading::AdOptions {
            placement: "reading_wait".to_owned(),
        })
        .await;
    });

    let timeline = entry.timeline.clone();
    let session = entry.session.clone();
    let pacing = state.pacing;
    tokio::spawn(async move {
        timeline.play(session, pacing).await;
    });

    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// POST /{id}/open
#[instrument(skip(state, request), fields(position_id = request.position_id))]
async fn open_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OpenCardRequest>,
) -> Result<Json<OpenCardResponse>, ApiError> {
    let entry = state.session(id)?;
    let outcome = command_handlers::handle_open_card(&entry.session, request.position_id)?;
    let session = query_handlers::session_view(&entry.session)?;

    let response = match outcome {
        OpenOutcome::Opened { all_open, .. } => OpenCardResponse {
            outcome: "opened",
            expected: None,
            warn: None,
            all_open: Some(all_open),
            session,
        },
        OpenOutcome::Denied {
            expected,
            first_warning,
        } => OpenCardResponse {
            outcome: "denied",
            expected: Some(expected),
            warn: Some(first_warning),
            all_open: None,
            session,
        },
        OpenOutcome::Ignored => OpenCardResponse {
            outcome: "ignored",
            expected: None,
            warn: None,
            all_open: None,
            session,
        },
    };
    Ok(Json(response))
}

/// POST /{id}/free-opening — the opening-order escape hatch.
#[instrument(skip(state))]
async fn free_opening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.session(id)?;
    command_handlers::handle_force_free_opening(&entry.session)?;
    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// POST /{id}/reset
#[instrument(skip(state))]
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.session(id)?;
    entry.timeline.cancel();
    command_handlers::handle_reset(&entry.session)?;
    Ok(Json(query_handlers::session_view(&entry.session)?))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(id)?;
    info!(session_id = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(delete_session))
        .route("/{id}/question", post(set_question))
        .route("/{id}/start", post(start_session))
        .route("/{id}/open", post(open_card))
        .route("/{id}/free-opening", post(free_opening))
        .route("/{id}/reset", post(reset_session))
}
